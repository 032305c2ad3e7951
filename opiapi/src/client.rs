//! HTTP client for the signage control server
//!
//! Two calls make up the whole control plane: the unauthenticated check-in
//! that may hand out a bearer token, and the authenticated playlist fetch.
//!
//! # Example
//!
//! ```no_run
//! use opiapi::{CheckIn, ControlPlane, ControlPlaneClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ControlPlaneClient::new("http://192.168.0.4:3000")?;
//!
//!     if let CheckIn::TokenAcquired(token) = client.check_in("AA:BB:CC:DD:EE:FF").await? {
//!         let items = client.fetch_media(&token).await?;
//!         println!("{} item(s) in playlist", items.len());
//!     }
//!     Ok(())
//! }
//! ```

use crate::error::{ApiError, Result};
use crate::models::{CheckIn, CheckInRequest, CheckInResponse, MediaItem};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header};
use tracing::{debug, warn};

/// Check-in endpoint, relative to the server URL
pub const CHECK_IN_PATH: &str = "/api/device/check-in";

/// Playlist endpoint, relative to the server URL
pub const MEDIA_PATH: &str = "/api/device/me/media";

/// Builds the HTTP client shared by every outbound request of the agent.
///
/// Certificate verification is disabled: the control server and the media
/// hosts live on a closed LAN with self-signed certificates.
pub fn insecure_http_client() -> Result<Client> {
    let client = Client::builder()
        .danger_accept_invalid_certs(true)
        .user_agent(concat!("OPISignage/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Operations the lifecycle controller needs from the control server.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Announces the device by MAC address.
    async fn check_in(&self, mac: &str) -> Result<CheckIn>;

    /// Retrieves the current playlist manifest.
    async fn fetch_media(&self, token: &str) -> Result<Vec<MediaItem>>;
}

/// Control server HTTP client
///
/// The client is stateless: the token is passed on every call and never
/// kept here.
#[derive(Debug, Clone)]
pub struct ControlPlaneClient {
    client: Client,
    server_url: String,
}

impl ControlPlaneClient {
    /// Create a client with its own insecure transport
    pub fn new(server_url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(insecure_http_client()?, server_url))
    }

    /// Create a client reusing an existing transport
    pub fn with_client(client: Client, server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self { client, server_url }
    }

    /// Get the server base URL
    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.server_url, path)
    }
}

#[async_trait]
impl ControlPlane for ControlPlaneClient {
    async fn check_in(&self, mac: &str) -> Result<CheckIn> {
        if mac.is_empty() {
            return Err(ApiError::MissingDeviceId);
        }

        let url = self.url(CHECK_IN_PATH);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(&CheckInRequest {
                mac_address: mac.to_string(),
            })
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Ok(CheckIn::StillPending),
            StatusCode::OK | StatusCode::CREATED => {
                let text = response.text().await?;
                let body: CheckInResponse = serde_json::from_str(&text)?;
                match body.access_token.map(|t| t.trim().to_string()) {
                    Some(token) if !token.is_empty() => Ok(CheckIn::TokenAcquired(token)),
                    _ => Err(ApiError::MissingToken),
                }
            }
            _ => Err(status_error("check-in", response).await),
        }
    }

    async fn fetch_media(&self, token: &str) -> Result<Vec<MediaItem>> {
        let url = self.url(MEDIA_PATH);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let text = response.text().await?;
                Ok(serde_json::from_str(&text)?)
            }
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            _ => Err(status_error("media", response).await),
        }
    }
}

async fn status_error(context: &'static str, response: Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!("{} answered {}: {}", context, status, body);
    ApiError::Status {
        context,
        status,
        body,
    }
}
