//! Account top-ups, optionally attached to what they fund.

use async_trait::async_trait;
use models::funding;
use models::status::FundingStatus;
use models::validate::validate_amount;
use sea_orm::prelude::Decimal;
use sea_orm::{Order, Set};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{guard_status_change, now, positive_amount, require_owner, stamp_owner};
use crate::crud::{Lifecycle, Operation};
use crate::errors::ServiceError;
use crate::events::{DomainEvent, FUNDING_WAS_COMPLETED};
use crate::filter::FilterField;
use crate::policy::Principal;
use crate::relation::{morph_pair, morph_target, EntityKind, FundableType, MorphTag, Target};
use crate::resource::{Column, RelationRef, Resource};

pub struct Funding;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateFunding {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub currency_id: Uuid,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    #[serde(default)]
    pub fundable_type: Option<String>,
    #[serde(default)]
    pub fundable_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFunding {
    #[validate(custom(function = "positive_amount"))]
    pub amount: Option<Decimal>,
    pub status: Option<FundingStatus>,
}

impl Resource for Funding {
    type Entity = funding::Entity;
    type Record = funding::Model;
    type Active = funding::ActiveModel;
    type Create = CreateFunding;
    type Update = UpdateFunding;

    const MODULE: &'static str = "funding";
    const LABEL: &'static str = "Funding";
    const FILTERS: &'static [FilterField] = &[
        FilterField::text("status"),
        FilterField::uuid("currency_id"),
        FilterField::uuid("user_id"),
        FilterField::text("fundable_type"),
        FilterField::uuid("fundable_id"),
    ];
    const WITH: &'static [&'static str] = &["currency"];

    fn id_column() -> Column<Self> { funding::Column::Id }

    fn owner_column() -> Option<Column<Self>> { Some(funding::Column::UserId) }

    fn default_order() -> (Column<Self>, Order) { (funding::Column::CreatedAt, Order::Desc) }

    fn id(record: &funding::Model) -> Uuid { record.id }

    fn owner(record: &funding::Model) -> Option<Uuid> { Some(record.user_id) }

    fn is_terminal(record: &funding::Model) -> bool { record.status == FundingStatus::Completed.as_str() }

    fn build(input: CreateFunding) -> Result<funding::ActiveModel, ServiceError> {
        let user_id = require_owner(input.user_id)?;
        validate_amount(&input.amount)?;
        let fundable =
            morph_pair::<FundableType>("fundable_type", "fundable_id", input.fundable_type.as_deref(), input.fundable_id)?;
        let now = now();
        Ok(funding::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            currency_id: Set(input.currency_id),
            amount: Set(input.amount),
            status: Set(FundingStatus::default().to_string()),
            fundable_type: Set(fundable.map(|(tag, _)| tag.tag().to_string())),
            fundable_id: Set(fundable.map(|(_, id)| id)),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply(active: &mut funding::ActiveModel, input: UpdateFunding) -> Result<(), ServiceError> {
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

    fn before_store(input: &mut CreateFunding, principal: &Principal) { stamp_owner(&mut input.user_id, principal) }

    fn completion() -> Option<UpdateFunding> {
        Some(UpdateFunding { status: Some(FundingStatus::Completed), ..Default::default() })
    }

    fn relations(record: &funding::Model) -> Vec<(&'static str, RelationRef)> {
        vec![
            ("currency", Ok(Some(Target::new(EntityKind::Currency, record.currency_id)))),
            ("fundable", morph_target::<FundableType>("fundable_type", record.fundable_type.as_deref(), record.fundable_id)),
        ]
    }

    fn references(input: &CreateFunding) -> Result<Vec<(&'static str, Target)>, ServiceError> {
        let pair = morph_pair::<FundableType>("fundable_type", "fundable_id", input.fundable_type.as_deref(), input.fundable_id)?;
        Ok(pair.map(|(tag, id)| ("fundable_id", Target::new(tag.kind(), id))).into_iter().collect())
    }
}

pub struct FundingHooks;

#[async_trait]
impl Lifecycle<Funding> for FundingHooks {
    async fn before_update(&self, principal: &Principal, _current: &funding::Model, input: &mut UpdateFunding) -> Result<(), ServiceError> {
        guard_status_change(principal, input.status.is_some(), Funding::LABEL)
    }

    fn completed(&self, record: &funding::Model, operation: Operation) -> Option<DomainEvent> {
        Some(
            DomainEvent::new(FUNDING_WAS_COMPLETED, Funding::MODULE, record.id, record)
                .with_meta("user_id", record.user_id)
                .with_meta("amount", record.amount)
                .with_meta("currency_id", record.currency_id)
                .with_meta("operation", operation.as_str()),
        )
    }
}
