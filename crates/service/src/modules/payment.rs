use async_trait::async_trait;
use models::payment;
use models::status::PaymentStatus;
use models::validate::validate_amount;
use sea_orm::prelude::Decimal;
use sea_orm::{Order, Set};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{guard_status_change, now, positive_amount, require_owner, stamp_owner};
use crate::crud::{Lifecycle, Operation};
use crate::errors::ServiceError;
use crate::events::{DomainEvent, PAYMENT_WAS_SUCCESSFUL};
use crate::filter::FilterField;
use crate::policy::Principal;
use crate::relation::{morph_pair, morph_target, EntityKind, MorphTag, PayableType, Target};
use crate::resource::{Column, RelationRef, Resource};

pub struct Payment;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePayment {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub currency_id: Uuid,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    #[validate(length(min = 1, max = 32))]
    pub method: String,
    #[serde(default)]
    pub payable_type: Option<String>,
    #[serde(default)]
    pub payable_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePayment {
    #[validate(length(min = 1, max = 32))]
    pub method: Option<String>,
    pub status: Option<PaymentStatus>,
}

impl Resource for Payment {
    type Entity = payment::Entity;
    type Record = payment::Model;
    type Active = payment::ActiveModel;
    type Create = CreatePayment;
    type Update = UpdatePayment;

    const MODULE: &'static str = "payment";
    const LABEL: &'static str = "Payment";
    const FILTERS: &'static [FilterField] = &[
        FilterField::text("status"),
        FilterField::text("method"),
        FilterField::uuid("currency_id"),
        FilterField::uuid("user_id"),
        FilterField::text("payable_type"),
        FilterField::uuid("payable_id"),
    ];
    const WITH: &'static [&'static str] = &["currency"];

    fn id_column() -> Column<Self> { payment::Column::Id }

    fn owner_column() -> Option<Column<Self>> { Some(payment::Column::UserId) }

    fn default_order() -> (Column<Self>, Order) { (payment::Column::CreatedAt, Order::Desc) }

    fn id(record: &payment::Model) -> Uuid { record.id }

    fn owner(record: &payment::Model) -> Option<Uuid> { Some(record.user_id) }

    fn is_terminal(record: &payment::Model) -> bool { record.status == PaymentStatus::Successful.as_str() }

    fn build(input: CreatePayment) -> Result<payment::ActiveModel, ServiceError> {
        let user_id = require_owner(input.user_id)?;
        validate_amount(&input.amount)?;
        let payable = morph_pair::<PayableType>("payable_type", "payable_id", input.payable_type.as_deref(), input.payable_id)?;
        let now = now();
        Ok(payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            currency_id: Set(input.currency_id),
            amount: Set(input.amount),
            method: Set(input.method.trim().to_ascii_lowercase()),
            status: Set(PaymentStatus::default().to_string()),
            payable_type: Set(payable.map(|(tag, _)| tag.tag().to_string())),
            payable_id: Set(payable.map(|(_, id)| id)),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply(active: &mut payment::ActiveModel, input: UpdatePayment) -> Result<(), ServiceError> {
        if let Some(method) = input.method {
            active.method = Set(method.trim().to_ascii_lowercase());
        }
        if let Some(status) = input.status {
            active.status = Set(status.to_string());
        }
        active.updated_at = Set(now());
        Ok(())
    }

    fn before_store(input: &mut CreatePayment, principal: &Principal) { stamp_owner(&mut input.user_id, principal) }

    fn completion() -> Option<UpdatePayment> {
        Some(UpdatePayment { status: Some(PaymentStatus::Successful), ..Default::default() })
    }

    fn relations(record: &payment::Model) -> Vec<(&'static str, RelationRef)> {
        vec![
            ("currency", Ok(Some(Target::new(EntityKind::Currency, record.currency_id)))),
            ("payable", morph_target::<PayableType>("payable_type", record.payable_type.as_deref(), record.payable_id)),
        ]
    }

    fn references(input: &CreatePayment) -> Result<Vec<(&'static str, Target)>, ServiceError> {
        let pair = morph_pair::<PayableType>("payable_type", "payable_id", input.payable_type.as_deref(), input.payable_id)?;
        Ok(pair.map(|(tag, id)| ("payable_id", Target::new(tag.kind(), id))).into_iter().collect())
    }
}

pub struct PaymentHooks;

#[async_trait]
impl Lifecycle<Payment> for PaymentHooks {
    async fn before_update(&self, principal: &Principal, _current: &payment::Model, input: &mut UpdatePayment) -> Result<(), ServiceError> {
        guard_status_change(principal, input.status.is_some(), Payment::LABEL)
    }

    fn completed(&self, record: &payment::Model, operation: Operation) -> Option<DomainEvent> {
        Some(
            DomainEvent::new(PAYMENT_WAS_SUCCESSFUL, Payment::MODULE, record.id, record)
                .with_meta("user_id", record.user_id)
                .with_meta("amount", record.amount)
                .with_meta("method", &record.method)
                .with_meta("operation", operation.as_str()),
        )
    }
}
