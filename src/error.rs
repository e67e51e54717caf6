use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SeedsError {
    #[error("seed store request failed: {0}")]
    Transport(String),

    #[error("seed store returned status {status}: {message}")]
    TransportStatus { status: u16, message: String },

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("missing config file vulkanseeds.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("seed not found: {0}")]
    SeedNotFound(String),

    #[error("invalid theme: {0} (expected light or dark)")]
    InvalidTheme(String),

    #[error("invalid sort mode: {0} (expected popular or recent)")]
    InvalidSortMode(String),
}

impl SeedsError {
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SeedsError::Transport(_) | SeedsError::TransportStatus { .. }
        )
    }
}
