//! Video output selection and X11 access for child processes.
//!
//! The agent usually runs as root from a service or an SSH session, so the
//! X server of the desktop session is not inherited: `DISPLAY` and
//! `XAUTHORITY` have to be rebuilt for the player and for `xrandr`.

use opiconfig::Config;
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;

/// Socket of the first local X server.
pub const X11_SOCKET: &str = "/tmp/.X11-unix/X0";

/// Video output used when no display server is reachable.
pub const FRAMEBUFFER_OUTPUT: &str = "fbdev2";

pub const X11_OUTPUT: &str = "x11";

const DEFAULT_DISPLAY: &str = ":0";
const XAUTHORITY_FILE: &str = ".Xauthority";

/// Snapshot of everything that decides where video goes.
#[derive(Debug, Clone)]
pub struct DisplayEnv {
    pub video_output_override: Option<String>,
    pub display: Option<String>,
    pub wayland_display: Option<String>,
    pub xauthority: Option<String>,
    pub sudo_user: Option<String>,
    pub x_socket: PathBuf,
    pub home_root: PathBuf,
    pub run_user_root: PathBuf,
    pub display_manager_authorities: Vec<PathBuf>,
}

impl DisplayEnv {
    pub fn from_config(config: &Config) -> Self {
        Self {
            video_output_override: config.video_output_override.clone(),
            display: config.display.clone(),
            wayland_display: config.wayland_display.clone(),
            xauthority: config.xauthority.clone(),
            sudo_user: config.sudo_user.clone(),
            x_socket: PathBuf::from(X11_SOCKET),
            home_root: PathBuf::from("/home"),
            run_user_root: PathBuf::from("/run/user"),
            display_manager_authorities: vec![
                PathBuf::from("/var/run/lightdm/.Xauthority"),
                PathBuf::from("/var/lib/gdm/.Xauthority"),
            ],
        }
    }

    fn x_socket_present(&self) -> bool {
        self.x_socket.exists()
    }

    /// Video output handed to the player.
    ///
    /// `MPLAYER_VO` wins verbatim; then `x11` when a display server is
    /// reachable; `fbdev2` otherwise.
    pub fn video_output(&self) -> String {
        if let Some(vo) = &self.video_output_override {
            return vo.clone();
        }
        if self.display.is_some() || self.wayland_display.is_some() || self.x_socket_present() {
            X11_OUTPUT.to_string()
        } else {
            FRAMEBUFFER_OUTPUT.to_string()
        }
    }

    /// `DISPLAY` for child processes: the inherited one, or `:0` when the
    /// local X socket exists.
    pub fn child_display(&self) -> Option<String> {
        if let Some(display) = &self.display {
            return Some(display.clone());
        }
        self.x_socket_present().then(|| DEFAULT_DISPLAY.to_string())
    }

    /// Locates an X authority file usable by root.
    ///
    /// Order: `XAUTHORITY`, home of `SUDO_USER`, home of `user`, the runtime
    /// dir of the X socket owner, then display-manager locations.
    pub fn xauthority_path(&self) -> Option<PathBuf> {
        if let Some(path) = self.xauthority.as_deref().map(PathBuf::from) {
            if path.exists() {
                return Some(path);
            }
        }

        let users = [self.sudo_user.as_deref(), Some("user")];
        for name in users.into_iter().flatten() {
            let path = self.home_root.join(name).join(XAUTHORITY_FILE);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(meta) = std::fs::metadata(&self.x_socket) {
            let path = self
                .run_user_root
                .join(meta.uid().to_string())
                .join(XAUTHORITY_FILE);
            if path.exists() {
                return Some(path);
            }
        }

        self.display_manager_authorities
            .iter()
            .find(|p| p.exists())
            .cloned()
    }

    /// Environment overrides for a child that talks to X.
    ///
    /// Returns `(DISPLAY, XAUTHORITY)`; `None` for XAUTHORITY means the
    /// variable must be removed from the child environment.
    pub fn x11_child_env(&self) -> Option<(String, Option<PathBuf>)> {
        let display = self.child_display()?;
        Some((display, self.xauthority_path()))
    }
}
