//! Pricing plans, shared reference data priced in a currency.

use models::pricing;
use models::status::PricingStatus;
use models::validate::{validate_amount, validate_name};
use sea_orm::prelude::Decimal;
use sea_orm::{Order, Set};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{now, positive_amount};
use crate::errors::ServiceError;
use crate::filter::FilterField;
use crate::relation::{EntityKind, Target};
use crate::resource::{Column, RelationRef, Resource};

pub struct Pricing;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePricing {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    pub currency_id: Uuid,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    #[serde(default)]
    pub status: Option<PricingStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePricing {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Option<Decimal>,
    pub status: Option<PricingStatus>,
}

impl Resource for Pricing {
    type Entity = pricing::Entity;
    type Record = pricing::Model;
    type Active = pricing::ActiveModel;
    type Create = CreatePricing;
    type Update = UpdatePricing;

    const MODULE: &'static str = "pricing";
    const LABEL: &'static str = "Pricing";
    const FILTERS: &'static [FilterField] = &[FilterField::text("status"), FilterField::uuid("currency_id")];
    const WITH: &'static [&'static str] = &["currency"];

    fn id_column() -> Column<Self> { pricing::Column::Id }

    fn default_order() -> (Column<Self>, Order) { (pricing::Column::CreatedAt, Order::Desc) }

    fn id(record: &pricing::Model) -> Uuid { record.id }

    fn build(input: CreatePricing) -> Result<pricing::ActiveModel, ServiceError> {
        validate_name(&input.name, 128)?;
        validate_amount(&input.amount)?;
        let now = now();
        Ok(pricing::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            currency_id: Set(input.currency_id),
            amount: Set(input.amount),
            status: Set(input.status.unwrap_or_default().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply(active: &mut pricing::ActiveModel, input: UpdatePricing) -> Result<(), ServiceError> {
        if let Some(name) = input.name {
            validate_name(&name, 128)?;
            active.name = Set(name.trim().to_string());
        }
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

    fn relations(record: &pricing::Model) -> Vec<(&'static str, RelationRef)> {
        vec![("currency", Ok(Some(Target::new(EntityKind::Currency, record.currency_id))))]
    }
}
