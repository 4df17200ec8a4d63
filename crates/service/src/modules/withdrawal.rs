use async_trait::async_trait;
use models::status::WithdrawalStatus;
use models::validate::{validate_amount, validate_destination};
use models::withdrawal;
use sea_orm::prelude::Decimal;
use sea_orm::{Order, Set};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{guard_status_change, now, positive_amount, require_owner, stamp_owner};
use crate::crud::{Lifecycle, Operation};
use crate::errors::ServiceError;
use crate::events::{DomainEvent, WITHDRAWAL_WAS_COMPLETED};
use crate::filter::FilterField;
use crate::policy::Principal;
use crate::relation::{EntityKind, Target};
use crate::resource::{Column, RelationRef, Resource};

pub struct Withdrawal;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWithdrawal {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub currency_id: Uuid,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    #[validate(length(min = 4, max = 256))]
    pub destination: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateWithdrawal {
    #[validate(length(min = 4, max = 256))]
    pub destination: Option<String>,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
    pub status: Option<WithdrawalStatus>,
}

impl Resource for Withdrawal {
    type Entity = withdrawal::Entity;
    type Record = withdrawal::Model;
    type Active = withdrawal::ActiveModel;
    type Create = CreateWithdrawal;
    type Update = UpdateWithdrawal;

    const MODULE: &'static str = "withdrawal";
    const LABEL: &'static str = "Withdrawal";
    const FILTERS: &'static [FilterField] = &[
        FilterField::text("status"),
        FilterField::uuid("currency_id"),
        FilterField::uuid("user_id"),
    ];
    const WITH: &'static [&'static str] = &["currency"];

    fn id_column() -> Column<Self> { withdrawal::Column::Id }

    fn owner_column() -> Option<Column<Self>> { Some(withdrawal::Column::UserId) }

    fn default_order() -> (Column<Self>, Order) { (withdrawal::Column::CreatedAt, Order::Desc) }

    fn id(record: &withdrawal::Model) -> Uuid { record.id }

    fn owner(record: &withdrawal::Model) -> Option<Uuid> { Some(record.user_id) }

    fn is_terminal(record: &withdrawal::Model) -> bool { record.status == WithdrawalStatus::Completed.as_str() }

    fn build(input: CreateWithdrawal) -> Result<withdrawal::ActiveModel, ServiceError> {
        let user_id = require_owner(input.user_id)?;
        validate_amount(&input.amount)?;
        validate_destination(&input.destination)?;
        let now = now();
        Ok(withdrawal::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            currency_id: Set(input.currency_id),
            amount: Set(input.amount),
            destination: Set(input.destination.trim().to_string()),
            note: Set(input.note),
            status: Set(WithdrawalStatus::default().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply(active: &mut withdrawal::ActiveModel, input: UpdateWithdrawal) -> Result<(), ServiceError> {
        if let Some(destination) = input.destination {
            validate_destination(&destination)?;
            active.destination = Set(destination.trim().to_string());
        }
        if let Some(note) = input.note {
            active.note = Set(Some(note));
        }
        if let Some(status) = input.status {
            active.status = Set(status.to_string());
        }
        active.updated_at = Set(now());
        Ok(())
    }

    fn before_store(input: &mut CreateWithdrawal, principal: &Principal) { stamp_owner(&mut input.user_id, principal) }

    fn completion() -> Option<UpdateWithdrawal> {
        Some(UpdateWithdrawal { status: Some(WithdrawalStatus::Completed), ..Default::default() })
    }

    fn relations(record: &withdrawal::Model) -> Vec<(&'static str, RelationRef)> {
        vec![("currency", Ok(Some(Target::new(EntityKind::Currency, record.currency_id))))]
    }
}

pub struct WithdrawalHooks;

#[async_trait]
impl Lifecycle<Withdrawal> for WithdrawalHooks {
    async fn before_update(&self, principal: &Principal, _current: &withdrawal::Model, input: &mut UpdateWithdrawal) -> Result<(), ServiceError> {
        guard_status_change(principal, input.status.is_some(), Withdrawal::LABEL)
    }

    async fn before_delete(&self, _principal: &Principal, record: &withdrawal::Model) -> Result<(), ServiceError> {
        if record.status == WithdrawalStatus::Approved.as_str() {
            return Err(ServiceError::BusinessRule("An approved withdrawal cannot be deleted.".into()));
        }
        Ok(())
    }

    fn completed(&self, record: &withdrawal::Model, operation: Operation) -> Option<DomainEvent> {
        Some(
            DomainEvent::new(WITHDRAWAL_WAS_COMPLETED, Withdrawal::MODULE, record.id, record)
                .with_meta("user_id", record.user_id)
                .with_meta("amount", record.amount)
                .with_meta("operation", operation.as_str()),
        )
    }
}
