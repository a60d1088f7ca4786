use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("upload is not configured: missing {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),
    #[error("file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("GITHUB_TOKEN is not usable as a header value")]
    InvalidToken(#[source] reqwest::header::InvalidHeaderValue),
    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),
    #[error("upload failed: {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl PublishError {
    /// Missing credentials rather than a failed upload.
    pub fn is_config(&self) -> bool {
        matches!(self, PublishError::MissingConfig(_))
    }
}
