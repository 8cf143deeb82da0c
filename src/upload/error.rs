//! Upload error types.

/// Errors produced while validating or transferring a file.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{0}")]
    Validation(String),

    #[error("Upload failed with status: {status}")]
    Http { status: u16, body: String },

    #[error("Failed to send request: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid curl command: {0}")]
    InvalidCurl(String),
}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}
