//! Error types for the playback pipeline

/// Result type alias for playback operations
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Errors raised while preparing or starting playback
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// Neither mplayer nor mpv is installed
    #[error("no video player found (install mplayer or mpv)")]
    MissingPlayer,

    /// ffmpeg is not installed
    #[error("ffmpeg not found (install ffmpeg)")]
    MissingMuxer,

    /// The media directory holds no playable video
    #[error("no video files in {0}")]
    NoMedia(String),

    /// A child process could not be started
    #[error("{program} start: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlayerError {
    pub(crate) fn spawn(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }
}
