//! Error types for content fetching, projection and rendering

use thiserror::Error;

/// Errors raised by the library layer
#[derive(Debug, Error)]
pub enum BlogError {
    /// Backend unreachable, timed out, or returned an unreadable body
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("Backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No {doc_type} document with uid {uid:?}")]
    NotFound { doc_type: String, uid: String },

    /// A raw record lacks a field the projection requires
    #[error("Record {record} is missing required field `{field}`")]
    Projection { record: String, field: &'static str },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Template error: {0}")]
    Render(#[from] tera::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlogError {
    /// True for failures of the transport itself, as opposed to bad data
    pub fn is_transport(&self) -> bool {
        matches!(self, BlogError::Transport(_) | BlogError::Status { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BlogError::NotFound { .. })
    }
}

impl From<reqwest::Error> for BlogError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            BlogError::Status {
                status: status.as_u16(),
                body: error.to_string(),
            }
        } else if error.is_timeout() {
            BlogError::Transport(format!("Request timeout: {}", error))
        } else if error.is_connect() {
            BlogError::Transport(format!("Connection error: {}", error))
        } else if error.is_decode() {
            BlogError::Transport(format!("Malformed response body: {}", error))
        } else {
            BlogError::Transport(format!("HTTP error: {}", error))
        }
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;
