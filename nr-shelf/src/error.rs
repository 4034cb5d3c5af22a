//! Error types for the shelf client

use thiserror::Error;

/// Shelf client error type
#[derive(Debug, Error)]
pub enum ShelfError {
    /// No user is signed in
    #[error("User not logged in")]
    NotLoggedIn,

    /// The service could not be reached
    #[error("Request failed: {0}")]
    Request(String),

    /// The service answered with an error status
    #[error("Service returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Gateway failure when running in-process
    #[error(transparent)]
    Gateway(#[from] nr_common::Error),

    /// Session storage failure
    #[error("Session storage error: {0}")]
    Session(String),
}

impl From<reqwest::Error> for ShelfError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ShelfError::Decode(err.to_string())
        } else {
            ShelfError::Request(err.to_string())
        }
    }
}

/// Result type for shelf client operations
pub type Result<T> = std::result::Result<T, ShelfError>;
