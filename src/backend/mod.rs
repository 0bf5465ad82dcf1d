pub mod http;

use async_trait::async_trait;
use std::error::Error;
use std::fmt;

/// Failure modes of a generate call, one variant per error the UI
/// distinguishes.
#[derive(Debug)]
pub enum BackendError {
    InvalidUrl(String),
    Timeout(String),
    ConnectionError(String),
    ResponseError { status: u16, body: String },
    InvalidResponse(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::InvalidUrl(msg) => write!(f, "Invalid backend URL: {}", msg),
            BackendError::Timeout(msg) => write!(f, "Backend request timed out: {}", msg),
            BackendError::ConnectionError(msg) => {
                write!(f, "Error connecting to backend: {}", msg)
            }
            BackendError::ResponseError { status, body } => {
                write!(f, "Backend responded with status {}: {}", status, body)
            }
            BackendError::InvalidResponse(msg) => {
                write!(f, "Malformed backend response: {}", msg)
            }
        }
    }
}

impl Error for BackendError {}

/// Seam between the web handlers and the text-to-SQL service. The service
/// itself is opaque; anything that can turn a question into SQL fits here.
#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate(&self, text: &str, base_url: &str) -> Result<String, BackendError>;
}
