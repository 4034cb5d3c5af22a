//! Common error types for Next Reads

use thiserror::Error;

/// Common result type for Next Reads operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the Next Reads crates
#[derive(Error, Debug)]
pub enum Error {
    /// Client request is missing a required parameter
    #[error("Missing parameter: {0}")]
    MissingParameter(String),

    /// Requested user, entry or named resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Category key is not one of the four reading-status names
    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    /// Content store call failed (network error or non-success status)
    #[error("Upstream failure: {0}")]
    Upstream(String),

    /// Management API rejected a stale entry version
    #[error("Version conflict: {0}")]
    Conflict(String),

    /// Entry failed validation at the gateway boundary
    #[error("Invalid entry {id}: {reason}")]
    InvalidEntry { id: String, reason: String },

    /// Response body or fixture could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A category mutation did not complete
    #[error("Category update failed: {0}")]
    CategoryUpdateFailed(#[source] Box<Error>),
}

impl Error {
    /// Wrap an error as a failed category mutation (never double-wraps)
    pub fn category_update_failed(cause: Error) -> Self {
        match cause {
            Error::CategoryUpdateFailed(_) => cause,
            other => Error::CategoryUpdateFailed(Box::new(other)),
        }
    }

    /// Innermost error, looking through `CategoryUpdateFailed`
    pub fn cause(&self) -> &Error {
        match self {
            Error::CategoryUpdateFailed(inner) => inner.cause(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.cause(), Error::NotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Parse(err.to_string())
        } else {
            Error::Upstream(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_update_failed_keeps_cause() {
        let err = Error::category_update_failed(Error::NotFound("user u1".to_string()));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Category update failed: Not found: user u1");
    }

    #[test]
    fn test_category_update_failed_not_double_wrapped() {
        let once = Error::category_update_failed(Error::Upstream("timeout".to_string()));
        let twice = Error::category_update_failed(once);
        match twice {
            Error::CategoryUpdateFailed(inner) => {
                assert!(matches!(*inner, Error::Upstream(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
