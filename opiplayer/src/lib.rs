//! Gapless playback for the OPI signage agent
//!
//! Playback is a two-process pipeline: an ffmpeg concat muxer loops over the
//! media directory forever and streams Matroska into mplayer or mpv.
//!
//! # Features
//!
//! - **Supervisor**: atomic start and stop of the muxer/player pair
//! - **Backends**: mplayer and mpv command lines with the same semantics
//! - **X11 access**: `DISPLAY`/`XAUTHORITY` reconstruction for root
//! - **Screen**: 1280x720 mode switch, console and framebuffer blanking
//! - **Preflight**: binary and sound card checks at startup

pub mod backend;
pub mod display;
pub mod error;
pub mod playlist;
pub mod preflight;
pub mod supervisor;
pub mod x11;

pub use backend::{CommandSpec, FfmpegLauncher, PipelineLauncher, PlayerBackend};
pub use display::{Screen, set_resolution};
pub use error::{PlayerError, Result};
pub use playlist::CONCAT_FILE;
pub use preflight::{Preflight, run_preflight};
pub use supervisor::Supervisor;
pub use x11::DisplayEnv;
