use std::path::PathBuf;

/// Result alias that carries the custom [`PlayerError`] type.
pub type Result<T> = std::result::Result<T, PlayerError>;

/// Every failure the player can report. None of them are fatal: the shell
/// logs them, shows them in the status line and keeps running.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// The media engine failed to start (or was compiled out).
    #[error("media engine is not initialized")]
    EngineUninitialized,
    /// The engine refused the requested media resource.
    #[error("could not open {}: {}", .path.display(), .reason)]
    MediaOpenFailed { path: PathBuf, reason: String },
    #[error("media does not support seeking")]
    SeekOnNonSeekableMedia,
    /// Release-seek requested before the engine reported a positive duration.
    #[error("cannot seek before the media duration is known")]
    SeekWithUnknownDuration,
    #[error("no media has been opened")]
    NoActiveSession,
    #[error("config: {0}")]
    Config(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl PlayerError {
    pub fn open_failed<P: Into<PathBuf>, T: ToString>(path: P, reason: T) -> Self {
        Self::MediaOpenFailed {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for PlayerError {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value.to_string())
    }
}
