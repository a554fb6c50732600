//! API error types and JSON error response formatting.
//!
//! Every failed request gets a `{"error", "message"}` body with a status
//! code chosen from the underlying [`ActionError`] or request problem.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gantry_action::ActionError;
use serde::Serialize;

/// JSON error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code (e.g., "bad_request", "not_found").
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 - malformed request body.
    BadRequest(String),
    /// 401 - missing or wrong API token.
    Unauthorized(String),
    /// 404 - unknown action, or nothing recorded for it.
    NotFound(String),
    /// 422 - action exists but cannot be run.
    UnprocessableEntity(String),
    /// 500 - the action failed or timed out, or the server hit an I/O error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::UnprocessableEntity(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable_entity", msg)
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: error_code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ActionError> for ApiError {
    fn from(err: ActionError) -> Self {
        match &err {
            ActionError::NotFound(_) | ActionError::InvalidName(_) => {
                ApiError::NotFound(err.to_string())
            }
            ActionError::ResolutionFailed { .. } => ApiError::UnprocessableEntity(err.to_string()),
            ActionError::Invocation(msg) => {
                ApiError::Internal(format!("Action execution failed: {}", msg))
            }
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ActionError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_action_error_status_mapping() {
        assert_eq!(
            status_of(ActionError::NotFound("ghost".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ActionError::ResolutionFailed {
                name: "x".into(),
                reason: "not executable".into()
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ActionError::Invocation("boom failed".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(ActionError::Timeout(std::time::Duration::from_secs(1))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invocation_message_keeps_action_text() {
        match ApiError::from(ActionError::Invocation("boom failed".into())) {
            ApiError::Internal(msg) => assert_eq!(msg, "Action execution failed: boom failed"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
