//! Screen helpers: output resolution and blanking between pipelines.
//!
//! Everything here is best effort. Failures are logged at debug level and
//! never reach the caller.

use crate::x11::DisplayEnv;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Modes tried in order on the first connected output.
pub const TARGET_MODES: [&str; 3] = ["1280x720", "1280x720_60.00", "1280x720_60"];

/// Clear screen, cursor home, hide cursor.
const CONSOLE_CLEAR: &[u8] = b"\x1b[2J\x1b[H\x1b[?25l";

/// Framebuffers above this size are assumed misreported.
const MAX_FRAMEBUFFER_BYTES: u64 = 64 * 1024 * 1024;

const FB_CHUNK: usize = 256 * 1024;

/// Name of the first output reported as ` connected` by `xrandr -q`.
pub fn first_connected_output(query: &str) -> Option<String> {
    query
        .lines()
        .find(|line| line.contains(" connected"))
        .and_then(|line| line.split_whitespace().next())
        .map(str::to_string)
}

/// Switches the first connected X output to 1280x720.
///
/// Does nothing when no X display is reachable. Returns true when a mode
/// was applied.
pub async fn set_resolution(env: &DisplayEnv) -> bool {
    let Some((display, xauthority)) = env.x11_child_env() else {
        return false;
    };

    let xrandr = |args: &[&str]| {
        let mut cmd = Command::new("xrandr");
        cmd.args(args).env("DISPLAY", &display);
        if let Some(path) = &xauthority {
            cmd.env("XAUTHORITY", path);
        }
        cmd
    };

    let output = match xrandr(&["-q"]).output().await {
        Ok(out) if out.status.success() => out,
        Ok(out) => {
            debug!("xrandr -q exited with {}", out.status);
            return false;
        }
        Err(e) => {
            debug!("xrandr unavailable: {}", e);
            return false;
        }
    };

    let Some(name) = first_connected_output(&String::from_utf8_lossy(&output.stdout)) else {
        debug!("xrandr reports no connected output");
        return false;
    };

    for mode in TARGET_MODES {
        let applied = xrandr(&["--output", name.as_str(), "--mode", mode])
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false);
        if applied {
            info!(output = %name, mode, "Screen resolution set to 1280x720");
            return true;
        }
    }
    false
}

/// Text console and framebuffer devices used to blank the screen.
#[derive(Debug, Clone)]
pub struct Screen {
    consoles: Vec<PathBuf>,
    framebuffer: PathBuf,
    sysfs: PathBuf,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            consoles: vec![
                PathBuf::from("/dev/tty1"),
                PathBuf::from("/dev/tty0"),
                PathBuf::from("/dev/console"),
            ],
            framebuffer: PathBuf::from("/dev/fb0"),
            sysfs: PathBuf::from("/sys/class/graphics/fb0"),
        }
    }
}

impl Screen {
    pub fn with_paths(consoles: Vec<PathBuf>, framebuffer: PathBuf, sysfs: PathBuf) -> Self {
        Self {
            consoles,
            framebuffer,
            sysfs,
        }
    }

    /// Clears the text console and paints the framebuffer black.
    pub fn blank(&self) {
        self.clear_console();
        self.clear_framebuffer();
    }

    /// Same as [`Screen::blank`], off the async runtime threads.
    pub async fn blank_async(&self) {
        let screen = self.clone();
        let _ = tokio::task::spawn_blocking(move || screen.blank()).await;
    }

    fn clear_console(&self) {
        for device in &self.consoles {
            let Ok(mut tty) = OpenOptions::new().write(true).open(device) else {
                continue;
            };
            let _ = tty.write_all(CONSOLE_CLEAR);
            break;
        }
    }

    fn clear_framebuffer(&self) {
        let Some(size) = framebuffer_size(&self.sysfs) else {
            return;
        };
        let Ok(mut fb) = OpenOptions::new().write(true).open(&self.framebuffer) else {
            return;
        };

        let zeros = vec![0u8; FB_CHUNK];
        let mut written = 0u64;
        while written < size {
            let n = (size - written).min(FB_CHUNK as u64) as usize;
            if fb.write_all(&zeros[..n]).is_err() {
                return;
            }
            written += n as u64;
        }
    }
}

/// Byte size of the framebuffer described by `sysfs`.
///
/// Dimensions come from `virtual_size`, else `width` + `height`; depth from
/// `bits_per_pixel`. `None` when a value is missing or non-positive, or when
/// the size exceeds 64 MiB.
pub fn framebuffer_size(sysfs: &Path) -> Option<u64> {
    let read_int = |name: &str| -> Option<i64> {
        std::fs::read_to_string(sysfs.join(name))
            .ok()?
            .trim()
            .parse()
            .ok()
    };

    let mut dims = std::fs::read_to_string(sysfs.join("virtual_size"))
        .ok()
        .and_then(|raw| {
            let mut parts = raw.trim().split(',');
            let w = parts.next()?.trim().parse::<i64>().ok()?;
            let h = parts.next()?.trim().parse::<i64>().ok()?;
            Some((w, h))
        })
        .filter(|(w, h)| *w > 0 && *h > 0);

    if dims.is_none() {
        dims = Some((read_int("width")?, read_int("height")?));
    }
    let (width, height) = dims?;
    let bpp = read_int("bits_per_pixel")?;

    if width <= 0 || height <= 0 || bpp <= 0 {
        return None;
    }
    let size = width.checked_mul(height)?.checked_mul(bpp / 8)?;
    if size <= 0 || size as u64 > MAX_FRAMEBUFFER_BYTES {
        return None;
    }
    Some(size as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const XRANDR_QUERY: &str = "\
Screen 0: minimum 320 x 200, current 1920 x 1080, maximum 8192 x 8192
HDMI-2 disconnected (normal left inverted right x axis y axis)
HDMI-1 connected primary 1920x1080+0+0 (normal left inverted right x axis y axis) 509mm x 286mm
   1920x1080     60.00*+
   1280x720      60.00
";

    fn sysfs_with(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            std::fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_first_connected_output_skips_disconnected() {
        assert_eq!(first_connected_output(XRANDR_QUERY).as_deref(), Some("HDMI-1"));
        assert_eq!(first_connected_output("HDMI-1 disconnected\n"), None);
    }

    #[test]
    fn test_framebuffer_size_from_virtual_size() {
        let dir = sysfs_with(&[("virtual_size", "1280,720\n"), ("bits_per_pixel", "32\n")]);
        assert_eq!(framebuffer_size(dir.path()), Some(1280 * 720 * 4));
    }

    #[test]
    fn test_framebuffer_size_from_width_height() {
        let dir = sysfs_with(&[("width", "800"), ("height", "480"), ("bits_per_pixel", "16")]);
        assert_eq!(framebuffer_size(dir.path()), Some(800 * 480 * 2));
    }

    #[test]
    fn test_framebuffer_size_rejects_bad_values() {
        let zero = sysfs_with(&[("virtual_size", "0,0"), ("bits_per_pixel", "32")]);
        assert_eq!(framebuffer_size(zero.path()), None);

        let no_bpp = sysfs_with(&[("virtual_size", "1280,720")]);
        assert_eq!(framebuffer_size(no_bpp.path()), None);

        let huge = sysfs_with(&[("virtual_size", "8192,8192"), ("bits_per_pixel", "32")]);
        assert_eq!(framebuffer_size(huge.path()), None);
    }

    #[test]
    fn test_blank_writes_console_and_framebuffer() {
        let dir = sysfs_with(&[("virtual_size", "64,32"), ("bits_per_pixel", "32")]);
        let console = dir.path().join("tty");
        let fb = dir.path().join("fb0");
        std::fs::write(&console, b"").unwrap();
        std::fs::write(&fb, vec![0xffu8; 64 * 32 * 4]).unwrap();

        let screen = Screen::with_paths(
            vec![dir.path().join("missing-tty"), console.clone()],
            fb.clone(),
            dir.path().to_path_buf(),
        );
        screen.blank();

        assert_eq!(std::fs::read(&console).unwrap(), CONSOLE_CLEAR);
        let pixels = std::fs::read(&fb).unwrap();
        assert_eq!(pixels.len(), 64 * 32 * 4);
        assert!(pixels.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_blank_without_devices_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let screen = Screen::with_paths(
            vec![dir.path().join("tty")],
            dir.path().join("fb0"),
            dir.path().to_path_buf(),
        );
        screen.blank();
        assert!(!dir.path().join("tty").exists());
    }
}
