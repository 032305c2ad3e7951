//! Error types for the control-plane client

/// Result type alias for control-plane operations
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur when talking to the control server
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No usable network interface, so there is no device id to announce
    #[error("mac address not found")]
    MissingDeviceId,

    /// HTTP request failed (DNS, connection, body read)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The server rejected the bearer token
    #[error("401: token invalid")]
    Unauthorized,

    /// Check-in succeeded but carried no usable token
    #[error("check-in response has no access token")]
    MissingToken,

    /// Unexpected status code, with the response body for diagnostics
    #[error("{context} {status}: {body}")]
    Status {
        context: &'static str,
        status: u16,
        body: String,
    },
}

impl ApiError {
    /// True when the server refused the token (fetch-media 401).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
