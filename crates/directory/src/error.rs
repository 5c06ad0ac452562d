//! Error types for the directory crate.

use thiserror::Error;

/// Result type alias for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Errors that can occur talking to the credential directory.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-2xx response from the directory
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid request or configuration
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Authentication error (missing or malformed token)
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl DirectoryError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}

impl From<DirectoryError> for apigate_core::Error {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Auth(message) => apigate_core::Error::authentication(message),
            other => apigate_core::Error::directory(other.to_string()),
        }
    }
}
