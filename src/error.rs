use std::path::PathBuf;

use thiserror::Error;

/// The request could not be turned into an upload. Nothing was sent.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Select a file first")]
    NoFileSelected,

    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status error: {status} {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl TransportError {
    pub fn http_status(status: reqwest::StatusCode, body: String) -> Self {
        Self::HttpStatus {
            status: status.as_u16(),
            body,
        }
    }

    /// Connection-level failures and 408 / 429 / 5xx are worth another try.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::HttpStatus { status, .. } => {
                *status == 408 || *status == 429 || (500..=599).contains(status)
            }
            TransportError::Http(e) => !e.is_decode() && !e.is_builder(),
            TransportError::Decode(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scan task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
