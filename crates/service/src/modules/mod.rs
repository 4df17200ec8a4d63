//! Resource declarations, one module per back-office entity.

pub mod currency;
pub mod pricing;
pub mod investment;
pub mod funding;
pub mod payment;
pub mod withdrawal;
pub mod transaction;

use chrono::Utc;
use sea_orm::prelude::{DateTimeWithTimeZone, Decimal};
use uuid::Uuid;
use validator::ValidationError;

use crate::errors::ServiceError;
use crate::policy::Principal;

pub(crate) fn now() -> DateTimeWithTimeZone { Utc::now().into() }

/// `validator` hook for money fields.
pub(crate) fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    models::validate::validate_amount(amount).map_err(|e| {
        let mut err = ValidationError::new("amount");
        err.message = Some(e.to_string().trim_start_matches("validation error: ").to_string().into());
        err
    })
}

/// Regular users always own what they create; elevated callers may create
/// on behalf of another user.
pub(crate) fn stamp_owner(user_id: &mut Option<Uuid>, principal: &Principal) {
    if !principal.is_elevated() || user_id.is_none() {
        *user_id = Some(principal.id);
    }
}

pub(crate) fn require_owner(user_id: Option<Uuid>) -> Result<Uuid, ServiceError> {
    user_id.ok_or_else(|| ServiceError::validation_field("user_id", "The user_id field is required."))
}

/// Status transitions are reserved for elevated callers.
pub(crate) fn guard_status_change(principal: &Principal, requested: bool, label: &str) -> Result<(), ServiceError> {
    if requested && !principal.is_elevated() {
        return Err(ServiceError::Forbidden(format!("You are not allowed to change the status of this {}.", label.to_lowercase())));
    }
    Ok(())
}
