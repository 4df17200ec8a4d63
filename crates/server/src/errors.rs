use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use service::{ErrorCode, ResponseEnvelope};
use thiserror::Error;
use tracing::error;

/// HTTP status for a failed envelope.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ValidationFailed | ErrorCode::InvalidType => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::AuthorizationDenied => StatusCode::FORBIDDEN,
        ErrorCode::BusinessRuleViolation => StatusCode::BAD_REQUEST,
        ErrorCode::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{message, data}` with `ok` on success, `{message, errors, code}` otherwise.
pub fn envelope_response(envelope: ResponseEnvelope<Value>, ok: StatusCode) -> Response {
    if envelope.is_success() {
        let body = json!({ "message": envelope.message(), "data": envelope.data().cloned().unwrap_or(Value::Null) });
        return (ok, Json(body)).into_response();
    }
    let code = envelope.code().unwrap_or(ErrorCode::Unexpected);
    ApiError { status: status_for(code), code, message: envelope.message().to_string(), errors: envelope.errors().cloned() }
        .into_response()
}

/// Failure raised before a request reaches a service (authentication, routing).
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: String,
    pub errors: Option<Value>,
}

impl ApiError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self { status: StatusCode::UNAUTHORIZED, code: ErrorCode::AuthorizationDenied, message: message.into(), errors: None }
    }

    pub fn route_not_found() -> Self {
        Self { status: StatusCode::NOT_FOUND, code: ErrorCode::NotFound, message: "Route not found.".into(), errors: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "message": self.message,
            "errors": self.errors.unwrap_or_else(|| json!({})),
            "code": self.code,
        });
        (self.status, Json(body)).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

impl IntoResponse for StartupError {
    fn into_response(self) -> Response {
        let msg = self.to_string();
        error!(error = %msg, "startup error");
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: ErrorCode::Unexpected,
            message: msg,
            errors: None,
        }
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_status_classes() {
        assert_eq!(status_for(ErrorCode::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::ValidationFailed), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(ErrorCode::InvalidType), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(ErrorCode::AuthorizationDenied), StatusCode::FORBIDDEN);
        assert_eq!(status_for(ErrorCode::BusinessRuleViolation), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorCode::Unexpected), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn success_uses_requested_status() {
        let res = envelope_response(ResponseEnvelope::success(json!({"id": 1}), "created"), StatusCode::CREATED);
        assert_eq!(res.status(), StatusCode::CREATED);
        let res = envelope_response(ResponseEnvelope::failure(ErrorCode::NotFound, "gone", None), StatusCode::CREATED);
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
