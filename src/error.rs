//! # Error Taxonomy
//! Request-scoped errors only; nothing in the pipeline is fatal to the
//! process. Provider failures and cache backend trouble are data handled
//! locally, not errors that escape (`ProviderFailure` lives in `providers`).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors that reach the HTTP boundary.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing/empty required text or malformed options. The pipeline is not entered.
    #[error("invalid input: {0}")]
    Input(String),

    /// Unexpected internal fault; surfaced as a request-scoped response, never a crash.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(e: anyhow::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            ServiceError::Input(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            ServiceError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        let body = Json(json!({
            "error": error,
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_maps_to_400() {
        let resp = ServiceError::input("missing required field: texts").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_error_maps_to_500() {
        let resp = ServiceError::Internal("boom".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
