use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Terminal failure of one download attempt.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Transfer failed: {0}")]
    Transport(#[source] BoxError),

    #[error("Download cancelled")]
    Cancelled,

    #[error("Cannot write {}: {source}", .path.display())]
    FilesystemUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DownloadError::Cancelled)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid YouTube URL or video ID: {0}")]
    InvalidInput(String),

    #[error("No videos found for \"{0}\"")]
    NoResults(String),

    #[error("No downloadable formats with audio for {0}")]
    NoFormats(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl AppError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Download(e) if e.is_cancelled())
    }
}
