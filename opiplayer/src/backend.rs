//! Command lines for the muxer and the two supported players.

use crate::x11::{DisplayEnv, FRAMEBUFFER_OUTPUT, X11_OUTPUT};
use std::fmt;
use std::path::{Path, PathBuf};

/// Forced output size, as `W:H` for the scale filter.
const SCALE_FILTER: &str = "scale=1280:720";

/// Player binary detected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerBackend {
    Mplayer,
    Mpv,
}

impl PlayerBackend {
    /// Candidates in order of preference.
    pub const PREFERENCE: [&'static str; 2] = ["mplayer", "mpv"];

    pub fn from_program(name: &str) -> Option<Self> {
        match name {
            "mplayer" => Some(Self::Mplayer),
            "mpv" => Some(Self::Mpv),
            _ => None,
        }
    }

    pub fn program(&self) -> &'static str {
        match self {
            Self::Mplayer => "mplayer",
            Self::Mpv => "mpv",
        }
    }

    /// Arguments reading a Matroska stream from stdin.
    ///
    /// Both players get the same meaning: pipe input, 1280x720 scaling, ALSA
    /// audio, the chosen video output, fullscreen under X11.
    pub fn args(&self, video_output: &str, audio_device: &str) -> Vec<String> {
        let fullscreen = video_output == X11_OUTPUT;
        match self {
            Self::Mplayer => {
                let mut args: Vec<String> = vec![
                    "-ao".into(),
                    format!("alsa:device={}", audio_device),
                    "-vo".into(),
                    video_output.into(),
                    "-vf".into(),
                    SCALE_FILTER.into(),
                    "-lavdopts".into(),
                    "lowres=0:fast".into(),
                    "-cache".into(),
                    "32768".into(),
                ];
                if fullscreen {
                    args.push("-fs".into());
                }
                args.push("-".into());
                args
            }
            Self::Mpv => {
                // mpv has no fbdev2 output; DRM is its console equivalent
                let vo = if video_output == FRAMEBUFFER_OUTPUT {
                    "drm"
                } else {
                    video_output
                };
                let mut args: Vec<String> = vec![
                    "-".into(),
                    format!("--vo={}", vo),
                    "--ao=alsa".into(),
                    format!("--audio-device=alsa/{}", audio_device),
                    format!("--vf={}", SCALE_FILTER),
                    "--cache=yes".into(),
                    "--demuxer-max-bytes=150M".into(),
                ];
                if fullscreen {
                    args.push("--fs".into());
                }
                args
            }
        }
    }
}

impl fmt::Display for PlayerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// A child process to start: program, arguments and environment edits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub env_remove: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn env_remove(mut self, key: impl Into<String>) -> Self {
        self.env_remove.push(key.into());
        self
    }

    pub fn display_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.to_string_lossy().into_owned())
    }

    pub(crate) fn to_command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        for key in &self.env_remove {
            cmd.env_remove(key);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Builds the two command lines of a pipeline.
pub trait PipelineLauncher: Send + Sync {
    /// Muxer reading `concat` and writing one stream on stdout.
    fn muxer(&self, concat: &Path) -> CommandSpec;

    /// Player reading that stream on stdin.
    fn player(&self) -> CommandSpec;
}

/// ffmpeg concat muxer feeding mplayer or mpv.
#[derive(Debug, Clone)]
pub struct FfmpegLauncher {
    pub muxer_program: PathBuf,
    /// Player binary resolved at preflight; its flavour is `backend`
    pub player_program: PathBuf,
    pub backend: PlayerBackend,
    pub audio_device: String,
    pub display: DisplayEnv,
}

impl PipelineLauncher for FfmpegLauncher {
    fn muxer(&self, concat: &Path) -> CommandSpec {
        CommandSpec::new(&self.muxer_program).args([
            "-stream_loop".to_string(),
            "-1".into(),
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            concat.to_string_lossy().into_owned(),
            "-fflags".into(),
            "+genpts".into(),
            "-c".into(),
            "copy".into(),
            "-f".into(),
            "matroska".into(),
            "-".into(),
        ])
    }

    fn player(&self) -> CommandSpec {
        let video_output = self.display.video_output();
        let mut spec = CommandSpec::new(&self.player_program)
            .args(self.backend.args(&video_output, &self.audio_device));

        if video_output == X11_OUTPUT {
            if let Some((display, xauthority)) = self.display.x11_child_env() {
                spec = spec.env("DISPLAY", display);
                spec = match xauthority {
                    Some(path) => spec.env("XAUTHORITY", path.to_string_lossy()),
                    None => spec.env_remove("XAUTHORITY"),
                };
            }
        }
        spec
    }
}
