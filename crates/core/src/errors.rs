//! Core error types for apigate.
//!
//! Transport-specific errors (reqwest, HTTP status codes) are converted into
//! these types by the directory client crate, keeping the coordinator free of
//! any HTTP dependency.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the environment coordinator and its collaborators.
#[derive(Error, Debug)]
pub enum Error {
    /// The credential directory could not be reached or answered with an error.
    #[error("Credential directory error: {0}")]
    Directory(String),

    /// A session token could not be acquired, or it was empty.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The local preference store failed to read or write.
    #[error("Preference store error: {0}")]
    Preference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a directory error
    pub fn directory(message: impl Into<String>) -> Self {
        Self::Directory(message.into())
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create a preference store error
    pub fn preference(message: impl Into<String>) -> Self {
        Self::Preference(message.into())
    }
}
