//! Error types for the load-test runner

use thiserror::Error;

/// Result type alias using the runner's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that end a run
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response from {url} is missing field `{field}`")]
    MissingField { url: String, field: &'static str },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Failure of a single artifact download.
///
/// These never end a run; the caller logs them and moves on.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status {status} for url {url}")]
    Status { status: u16, url: String },

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    /// Short name of the failure class, used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            DownloadError::Http(_) => "http",
            DownloadError::Status { .. } => "status",
            DownloadError::Io(_) => "io",
        }
    }
}
