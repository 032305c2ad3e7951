//! Wire models for the control server API

use serde::{Deserialize, Serialize};

/// Body of `POST /api/device/check-in`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckInRequest {
    #[serde(rename = "macAddress")]
    pub mac_address: String,
}

/// Successful check-in answer
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CheckInResponse {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
}

/// Outcome of a check-in round
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckIn {
    /// The device is assigned to a group; here is its bearer token
    TokenAcquired(String),
    /// The server knows the device but no group has been assigned yet (401)
    StillPending,
}

/// One entry of the playlist manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaItem {
    /// Server-side identifier, used to derive the local file name
    #[serde(default)]
    pub id: String,
    /// Download location; empty means "skip"
    #[serde(default)]
    pub url: String,
    /// Human label, only used in logs
    #[serde(default)]
    pub name: String,
}

impl MediaItem {
    pub fn new(id: impl Into<String>, url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            name: name.into(),
        }
    }
}
