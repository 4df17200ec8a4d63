use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Machine-readable failure category carried by every failed envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationFailed,
    AuthorizationDenied,
    InvalidType,
    BusinessRuleViolation,
    Unexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::AuthorizationDenied => "AUTHORIZATION_DENIED",
            ErrorCode::InvalidType => "INVALID_TYPE",
            ErrorCode::BusinessRuleViolation => "BUSINESS_RULE_VIOLATION",
            ErrorCode::Unexpected => "UNEXPECTED",
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("validation error: {message}")]
    Validation { message: String, errors: Option<Value> },
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("The selected {field} is invalid.")]
    InvalidType { field: String, tag: String },
    #[error("{0}")]
    BusinessRule(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into(), errors: None }
    }

    /// Validation failure attributed to one field, shaped `{field: [message]}`.
    pub fn validation_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::Validation { errors: Some(json!({ field: [message.clone()] })), message }
    }

    pub fn invalid_type(field: &str, tag: &str) -> Self {
        Self::InvalidType { field: field.to_string(), tag: tag.to_string() }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::NotFound(_) => ErrorCode::NotFound,
            ServiceError::Validation { .. } => ErrorCode::ValidationFailed,
            ServiceError::Model(models::errors::ModelError::Validation(_)) => ErrorCode::ValidationFailed,
            ServiceError::Forbidden(_) => ErrorCode::AuthorizationDenied,
            ServiceError::InvalidType { .. } => ErrorCode::InvalidType,
            ServiceError::BusinessRule(_) => ErrorCode::BusinessRuleViolation,
            ServiceError::Db(_) | ServiceError::Internal(_) | ServiceError::Model(_) => ErrorCode::Unexpected,
        }
    }

    /// Message safe to show to API clients; internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::NotFound(msg) | ServiceError::BusinessRule(msg) => msg.clone(),
            ServiceError::Validation { message, .. } => message.clone(),
            ServiceError::Forbidden(msg) => msg.clone(),
            ServiceError::InvalidType { .. } => self.to_string(),
            ServiceError::Model(models::errors::ModelError::Validation(msg)) => msg.clone(),
            ServiceError::Db(_) | ServiceError::Internal(_) | ServiceError::Model(_) => {
                "Something went wrong while processing the request.".to_string()
            }
        }
    }

    /// Structured detail for the envelope's `errors` member.
    pub fn details(&self) -> Option<Value> {
        match self {
            ServiceError::Validation { errors, .. } => errors.clone(),
            ServiceError::InvalidType { field, tag } => Some(json!({
                field.as_str(): [format!("The selected {} is invalid.", field)],
                "tag": tag,
            })),
            ServiceError::Model(models::errors::ModelError::Validation(msg)) => Some(json!({ "model": [msg] })),
            _ => None,
        }
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { ServiceError::Db(e.to_string()) }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errs: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errs.field_errors().keys().map(|k| k.to_string()).collect();
        fields.sort();
        let message = format!("The given data was invalid: {}.", fields.join(", "));
        let errors = serde_json::to_value(&errs).ok();
        ServiceError::Validation { message, errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::ModelError;

    #[test]
    fn codes_follow_taxonomy() {
        assert_eq!(ServiceError::not_found("Funding").code(), ErrorCode::NotFound);
        assert_eq!(ServiceError::validation("bad").code(), ErrorCode::ValidationFailed);
        assert_eq!(ServiceError::Forbidden("no".into()).code(), ErrorCode::AuthorizationDenied);
        assert_eq!(ServiceError::invalid_type("payable_type", "bogus").code(), ErrorCode::InvalidType);
        assert_eq!(ServiceError::BusinessRule("done".into()).code(), ErrorCode::BusinessRuleViolation);
        assert_eq!(ServiceError::Db("boom".into()).code(), ErrorCode::Unexpected);
        assert_eq!(ServiceError::from(ModelError::invalid("x")).code(), ErrorCode::ValidationFailed);
        assert_eq!(ServiceError::from(ModelError::Db("x".into())).code(), ErrorCode::Unexpected);
    }

    #[test]
    fn unexpected_errors_hide_details() {
        let err = ServiceError::Db("relation \"funding\" does not exist".into());
        assert!(!err.public_message().contains("relation"));
        assert!(err.details().is_none());
    }

    #[test]
    fn invalid_type_names_the_field() {
        let err = ServiceError::invalid_type("entity_type", "bogus");
        assert!(err.public_message().contains("entity_type"));
        let details = err.details().unwrap();
        assert!(details.get("entity_type").is_some());
        assert_eq!(details["tag"], "bogus");
    }

    #[test]
    fn error_code_serializes_screaming_snake() {
        assert_eq!(serde_json::to_value(ErrorCode::BusinessRuleViolation).unwrap(), "BUSINESS_RULE_VIOLATION");
        assert_eq!(ErrorCode::InvalidType.as_str(), "INVALID_TYPE");
    }
}
