//! # OPI Signage Configuration Module
//!
//! This module provides configuration management for the signage agent:
//! - Reading settings from the process environment
//! - Applying defaults for every unset or empty variable
//! - Preparing the media directory as an absolute path
//! - Persisting the bearer token between restarts ([`TokenStore`])
//!
//! ## Usage
//!
//! ```no_run
//! use opiconfig::Config;
//!
//! let mut config = Config::from_env();
//! config.prepare_media_dir()?;
//! println!("server: {}", config.server_url);
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::info;

mod token;

pub use token::TokenStore;

const ENV_SERVER_URL: &str = "SERVER_URL";
const ENV_MEDIA_DIR: &str = "MEDIA_DIR";
const ENV_VIDEO_OUTPUT: &str = "MPLAYER_VO";
const ENV_AUDIO_DEVICE: &str = "MPLAYER_AUDIO_DEVICE";
const ENV_DISPLAY: &str = "DISPLAY";
const ENV_WAYLAND_DISPLAY: &str = "WAYLAND_DISPLAY";
const ENV_XAUTHORITY: &str = "XAUTHORITY";
const ENV_SUDO_USER: &str = "SUDO_USER";

// Default values for configuration
pub const DEFAULT_SERVER_URL: &str = "http://192.168.0.4:3000";
pub const DEFAULT_MEDIA_DIR: &str = "./media";
pub const DEFAULT_AUDIO_DEVICE: &str = "plughw:1,0";
pub const TOKEN_FILE: &str = ".jwt";

/// Typed snapshot of the agent environment.
///
/// The snapshot is taken once at startup; nothing re-reads the environment
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Control server base URL, without trailing slash
    pub server_url: String,
    /// Directory mirroring the playlist (absolute after [`Config::prepare_media_dir`])
    pub media_dir: PathBuf,
    /// `MPLAYER_VO`, passed verbatim to the player when set
    pub video_output_override: Option<String>,
    /// ALSA device handed to the player
    pub audio_device: String,
    pub display: Option<String>,
    pub wayland_display: Option<String>,
    pub xauthority: Option<String>,
    pub sudo_user: Option<String>,
    /// Location of the persisted bearer token
    pub token_path: PathBuf,
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let server_url = get(ENV_SERVER_URL)
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        Self {
            server_url,
            media_dir: PathBuf::from(
                get(ENV_MEDIA_DIR).unwrap_or_else(|| DEFAULT_MEDIA_DIR.to_string()),
            ),
            video_output_override: get(ENV_VIDEO_OUTPUT),
            audio_device: get(ENV_AUDIO_DEVICE).unwrap_or_else(|| DEFAULT_AUDIO_DEVICE.to_string()),
            display: get(ENV_DISPLAY),
            wayland_display: get(ENV_WAYLAND_DISPLAY),
            xauthority: get(ENV_XAUTHORITY),
            sudo_user: get(ENV_SUDO_USER),
            token_path: PathBuf::from(TOKEN_FILE),
        }
    }

    /// Creates the media directory if needed and makes its path absolute.
    ///
    /// Failure here is fatal for the agent.
    pub fn prepare_media_dir(&mut self) -> Result<&Path> {
        fs::create_dir_all(&self.media_dir).with_context(|| {
            format!("cannot create media directory {}", self.media_dir.display())
        })?;
        let absolute = fs::canonicalize(&self.media_dir).with_context(|| {
            format!("cannot resolve media directory {}", self.media_dir.display())
        })?;
        info!(path = %absolute.display(), "Media directory ready");
        self.media_dir = absolute;
        Ok(&self.media_dir)
    }

    /// Token store bound to [`Config::token_path`].
    pub fn token_store(&self) -> TokenStore {
        TokenStore::new(&self.token_path)
    }
}
