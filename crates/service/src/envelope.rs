//! Uniform result wrapper returned by every service operation.
//!
//! A successful envelope carries `data` and never `errors`/`code`; a failed one
//! carries a `code` and never `data`.

use serde::Serialize;
use serde_json::Value;

use crate::errors::{ErrorCode, ServiceError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseEnvelope<T> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorCode>,
}

impl<T> ResponseEnvelope<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self { success: true, message: message.into(), data: Some(data), errors: None, code: None }
    }

    pub fn failure(code: ErrorCode, message: impl Into<String>, errors: Option<Value>) -> Self {
        Self { success: false, message: message.into(), data: None, errors, code: Some(code) }
    }

    pub fn from_error(err: &ServiceError) -> Self {
        Self::failure(err.code(), err.public_message(), err.details())
    }

    pub fn is_success(&self) -> bool { self.success }

    pub fn message(&self) -> &str { &self.message }

    pub fn data(&self) -> Option<&T> { self.data.as_ref() }

    pub fn into_data(self) -> Option<T> { self.data }

    pub fn errors(&self) -> Option<&Value> { self.errors.as_ref() }

    pub fn code(&self) -> Option<ErrorCode> { self.code }

    /// Replace the payload of a successful envelope. Failed envelopes are left
    /// untouched so they never gain data.
    pub fn set_data(&mut self, data: T) {
        if self.success {
            self.data = Some(data);
        }
    }

    pub fn map_data<U>(self, f: impl FnOnce(T) -> U) -> ResponseEnvelope<U> {
        ResponseEnvelope {
            success: self.success,
            message: self.message,
            data: self.data.map(f),
            errors: self.errors,
            code: self.code,
        }
    }
}

impl<T: Serialize> ResponseEnvelope<T> {
    /// Erase the payload type. A payload that fails to serialize turns the
    /// envelope into an `UNEXPECTED` failure.
    pub fn into_json(self) -> ResponseEnvelope<Value> {
        if !self.success {
            return self.map_data(|_| Value::Null);
        }
        match self.data.as_ref().map(serde_json::to_value).transpose() {
            Ok(data) => ResponseEnvelope { success: true, message: self.message, data, errors: None, code: None },
            Err(e) => ResponseEnvelope::from_error(&ServiceError::Internal(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_has_no_code() {
        let env = ResponseEnvelope::success(json!({"id": 1}), "Funding created successfully");
        assert!(env.is_success());
        assert!(env.code().is_none());
        assert!(env.errors().is_none());
        let body = serde_json::to_value(&env).unwrap();
        assert_eq!(body["success"], true);
        assert!(body.get("code").is_none());
    }

    #[test]
    fn failure_never_carries_data() {
        let mut env: ResponseEnvelope<i32> = ResponseEnvelope::from_error(&ServiceError::not_found("Funding"));
        env.set_data(5);
        assert!(!env.is_success());
        assert!(env.data().is_none());
        assert_eq!(env.code(), Some(ErrorCode::NotFound));
        assert_eq!(env.message(), "Funding not found");
    }

    #[test]
    fn set_data_replaces_payload_on_success() {
        let mut env = ResponseEnvelope::success(1, "ok");
        env.set_data(2);
        assert_eq!(env.data(), Some(&2));
        let mapped = env.map_data(|n| n * 10);
        assert_eq!(mapped.into_data(), Some(20));
    }

    #[test]
    fn into_json_keeps_failure_shape() {
        let env: ResponseEnvelope<i32> = ResponseEnvelope::failure(ErrorCode::InvalidType, "bad", Some(json!({"f": ["x"]})));
        let json_env = env.into_json();
        assert!(json_env.data().is_none());
        assert_eq!(json_env.code(), Some(ErrorCode::InvalidType));
        assert_eq!(json_env.errors().unwrap()["f"][0], "x");
    }
}
