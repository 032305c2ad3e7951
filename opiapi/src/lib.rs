//! Control-plane client library for the OPI signage agent
//!
//! This crate isolates everything HTTP and JSON about the control server:
//!
//! - **Check-in**: announce the device MAC, receive a bearer token once an
//!   operator has assigned the device to a group
//! - **Playlist**: fetch the ordered list of media items for the device
//! - **Transport**: a shared [`reqwest::Client`] that skips certificate checks
//!
//! Status codes are mapped to outcomes here so that callers only deal with
//! [`CheckIn`] values and [`ApiError`] variants.
//!
//! # Example
//!
//! ```no_run
//! use opiapi::{CheckIn, ControlPlane, ControlPlaneClient};
//!
//! # tokio_test::block_on(async {
//! let client = ControlPlaneClient::new("http://192.168.0.4:3000")?;
//! if let CheckIn::TokenAcquired(token) = client.check_in("AA:BB:CC:DD:EE:FF").await? {
//!     let items = client.fetch_media(&token).await?;
//!     println!("{} item(s)", items.len());
//! }
//! # Ok::<(), opiapi::ApiError>(())
//! # });
//! ```

pub mod client;
pub mod error;
pub mod models;

pub use client::{CHECK_IN_PATH, ControlPlane, ControlPlaneClient, MEDIA_PATH, insecure_http_client};
pub use error::{ApiError, Result};
pub use models::{CheckIn, CheckInRequest, MediaItem};
