//! HTTP error type for nr-web
//!
//! Every error body is flat: `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nr_common::api::{ErrorResponse, MISSING_PARAMETERS};
use thiserror::Error;
use tracing::warn;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required request field absent or body undecodable (400)
    #[error("{}", MISSING_PARAMETERS)]
    MissingParameters,

    /// Malformed request (400)
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Internal server error (500)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Failure of a bookshelf mutation: always 500 carrying the cause
    pub fn gateway(err: nr_common::Error) -> Self {
        match err {
            nr_common::Error::MissingParameter(_) => ApiError::MissingParameters,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Catalog reads: lookups that find nothing are 404
impl From<nr_common::Error> for ApiError {
    fn from(err: nr_common::Error) -> Self {
        use nr_common::Error;
        match err.cause() {
            Error::MissingParameter(_) => ApiError::MissingParameters,
            Error::NotFound(msg) => ApiError::NotFound(format!("Not found: {}", msg)),
            Error::InvalidCategory(_) => ApiError::BadRequest(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingParameters | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_error_mapping() {
        let not_found: ApiError = nr_common::Error::NotFound("book b9".to_string()).into();
        assert!(matches!(not_found, ApiError::NotFound(_)));

        let upstream: ApiError = nr_common::Error::Upstream("timeout".to_string()).into();
        assert!(matches!(upstream, ApiError::Internal(_)));

        let missing = ApiError::gateway(nr_common::Error::MissingParameter("userId".to_string()));
        assert_eq!(missing.to_string(), "Missing parameters");
    }

    #[test]
    fn test_gateway_failure_is_internal_even_when_not_found() {
        let err = ApiError::gateway(nr_common::Error::category_update_failed(
            nr_common::Error::NotFound("entry u1".to_string()),
        ));
        assert!(matches!(err, ApiError::Internal(ref msg) if msg.contains("entry u1")));
    }
}
