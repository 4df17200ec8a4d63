use async_trait::async_trait;
use models::investment;
use models::status::InvestmentStatus;
use models::validate::validate_amount;
use sea_orm::prelude::Decimal;
use sea_orm::{Order, Set};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{guard_status_change, now, positive_amount, require_owner, stamp_owner};
use crate::crud::{Lifecycle, Operation};
use crate::errors::ServiceError;
use crate::events::{DomainEvent, INVESTMENT_WAS_COMPLETED};
use crate::filter::FilterField;
use crate::policy::Principal;
use crate::relation::{EntityKind, Target};
use crate::resource::{Column, RelationRef, Resource};

pub struct Investment;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvestment {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub pricing_id: Option<Uuid>,
    pub currency_id: Uuid,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateInvestment {
    #[validate(custom(function = "positive_amount"))]
    pub amount: Option<Decimal>,
    pub status: Option<InvestmentStatus>,
}

impl Resource for Investment {
    type Entity = investment::Entity;
    type Record = investment::Model;
    type Active = investment::ActiveModel;
    type Create = CreateInvestment;
    type Update = UpdateInvestment;

    const MODULE: &'static str = "investment";
    const LABEL: &'static str = "Investment";
    const FILTERS: &'static [FilterField] = &[
        FilterField::text("status"),
        FilterField::uuid("currency_id"),
        FilterField::uuid("pricing_id"),
        FilterField::uuid("user_id"),
    ];
    const WITH: &'static [&'static str] = &["currency"];

    fn id_column() -> Column<Self> { investment::Column::Id }

    fn owner_column() -> Option<Column<Self>> { Some(investment::Column::UserId) }

    fn default_order() -> (Column<Self>, Order) { (investment::Column::CreatedAt, Order::Desc) }

    fn id(record: &investment::Model) -> Uuid { record.id }

    fn owner(record: &investment::Model) -> Option<Uuid> { Some(record.user_id) }

    fn is_terminal(record: &investment::Model) -> bool { record.status == InvestmentStatus::Completed.as_str() }

    fn build(input: CreateInvestment) -> Result<investment::ActiveModel, ServiceError> {
        let user_id = require_owner(input.user_id)?;
        validate_amount(&input.amount)?;
        let now = now();
        Ok(investment::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            pricing_id: Set(input.pricing_id),
            currency_id: Set(input.currency_id),
            amount: Set(input.amount),
            status: Set(InvestmentStatus::default().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply(active: &mut investment::ActiveModel, input: UpdateInvestment) -> Result<(), ServiceError> {
        if let Some(amount) = input.amount {
            validate_amount(&amount)?;
            active.amount = Set(amount);
        }
        if let Some(status) = input.status {
            active.status = Set(status.to_string());
        }
        active.updated_at = Set(now());
        Ok(())
    }

    fn before_store(input: &mut CreateInvestment, principal: &Principal) { stamp_owner(&mut input.user_id, principal) }

    fn completion() -> Option<UpdateInvestment> {
        Some(UpdateInvestment { status: Some(InvestmentStatus::Completed), ..Default::default() })
    }

    fn relations(record: &investment::Model) -> Vec<(&'static str, RelationRef)> {
        vec![
            ("currency", Ok(Some(Target::new(EntityKind::Currency, record.currency_id)))),
            ("pricing", Ok(record.pricing_id.map(|id| Target::new(EntityKind::Pricing, id)))),
        ]
    }
}

pub struct InvestmentHooks;

#[async_trait]
impl Lifecycle<Investment> for InvestmentHooks {
    async fn before_update(&self, principal: &Principal, _current: &investment::Model, input: &mut UpdateInvestment) -> Result<(), ServiceError> {
        guard_status_change(principal, input.status.is_some(), Investment::LABEL)
    }

    fn completed(&self, record: &investment::Model, operation: Operation) -> Option<DomainEvent> {
        Some(
            DomainEvent::new(INVESTMENT_WAS_COMPLETED, Investment::MODULE, record.id, record)
                .with_meta("user_id", record.user_id)
                .with_meta("amount", record.amount)
                .with_meta("operation", operation.as_str()),
        )
    }
}
