//! Currencies are shared reference data. At most one is flagged default.

use std::sync::Arc;

use async_trait::async_trait;
use models::currency;
use models::validate::{validate_currency_code, validate_name};
use sea_orm::{Order, Set};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::now;
use crate::crud::{respond, CrudService, Lifecycle, Operation};
use crate::envelope::ResponseEnvelope;
use crate::errors::ServiceError;
use crate::filter::{FilterField, FilterSet};
use crate::pagination::Pagination;
use crate::policy::{Principal, Scope};
use crate::repository::Repository;
use crate::resource::{Column, Resource};

pub struct Currency;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCurrency {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(min = 1, max = 8))]
    pub symbol: String,
    /// Trimmed and upper-cased before the three-letter check.
    pub code: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCurrency {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 8))]
    pub symbol: Option<String>,
    pub code: Option<String>,
    pub is_default: Option<bool>,
}

impl Resource for Currency {
    type Entity = currency::Entity;
    type Record = currency::Model;
    type Active = currency::ActiveModel;
    type Create = CreateCurrency;
    type Update = UpdateCurrency;

    const MODULE: &'static str = "currency";
    const LABEL: &'static str = "Currency";
    const FILTERS: &'static [FilterField] = &[
        FilterField::text("code"),
        FilterField::text("name"),
        FilterField::bool("is_default"),
    ];

    fn id_column() -> Column<Self> { currency::Column::Id }

    fn default_order() -> (Column<Self>, Order) { (currency::Column::CreatedAt, Order::Desc) }

    fn id(record: &currency::Model) -> Uuid { record.id }

    fn build(input: CreateCurrency) -> Result<currency::ActiveModel, ServiceError> {
        validate_name(&input.name, 64)?;
        let code = validate_currency_code(&input.code)?;
        let now = now();
        Ok(currency::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            symbol: Set(input.symbol.trim().to_string()),
            code: Set(code),
            is_default: Set(input.is_default),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply(active: &mut currency::ActiveModel, input: UpdateCurrency) -> Result<(), ServiceError> {
        if let Some(name) = input.name {
            validate_name(&name, 64)?;
            active.name = Set(name.trim().to_string());
        }
        if let Some(symbol) = input.symbol {
            active.symbol = Set(symbol.trim().to_string());
        }
        if let Some(code) = input.code {
            active.code = Set(validate_currency_code(&code)?);
        }
        if let Some(is_default) = input.is_default {
            active.is_default = Set(is_default);
        }
        active.updated_at = Set(now());
        Ok(())
    }
}

/// Keeps codes unique and the default flag exclusive.
pub struct CurrencyHooks {
    repo: Arc<dyn Repository<Currency>>,
}

impl CurrencyHooks {
    pub fn new(repo: Arc<dyn Repository<Currency>>) -> Self { Self { repo } }

    async fn ensure_code_free(&self, code: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
        let code = validate_currency_code(code)?;
        let taken = self
            .repo
            .list(&FilterSet::new().eq("code", code), Pagination::new(1, 1), Scope::All)
            .await?
            .items
            .into_iter()
            .any(|c| Some(c.id) != except);
        if taken {
            return Err(ServiceError::validation_field("code", "The code has already been taken."));
        }
        Ok(())
    }

    /// Clear the default flag on every currency other than `keep`.
    async fn clear_other_defaults(&self, keep: Uuid) -> Result<(), ServiceError> {
        let defaults = self
            .repo
            .list(&FilterSet::new().eq("is_default", true), Pagination::new(1, crate::pagination::MAX_PER_PAGE), Scope::All)
            .await?;
        for other in defaults.items.into_iter().filter(|c| c.id != keep) {
            self.repo.update(other.id, UpdateCurrency { is_default: Some(false), ..Default::default() }).await?;
            info!(currency_id = %other.id, new_default = %keep, "currency_default_cleared");
        }
        Ok(())
    }
}

#[async_trait]
impl Lifecycle<Currency> for CurrencyHooks {
    async fn before_create(&self, _principal: &Principal, input: &mut CreateCurrency) -> Result<(), ServiceError> {
        self.ensure_code_free(&input.code, None).await
    }

    async fn after_create(&self, record: &currency::Model) -> Result<(), ServiceError> {
        if record.is_default {
            self.clear_other_defaults(record.id).await?;
        }
        Ok(())
    }

    async fn before_update(&self, _principal: &Principal, current: &currency::Model, input: &mut UpdateCurrency) -> Result<(), ServiceError> {
        if let Some(code) = &input.code {
            self.ensure_code_free(code, Some(current.id)).await?;
        }
        Ok(())
    }

    async fn after_update(&self, record: &currency::Model) -> Result<(), ServiceError> {
        if record.is_default {
            self.clear_other_defaults(record.id).await?;
        }
        Ok(())
    }
}

impl CrudService<Currency> {
    /// The currency flagged default, or `NOT_FOUND` when none is.
    pub async fn default_currency(&self) -> ResponseEnvelope<currency::Model> {
        let result = self
            .repository()
            .list(&FilterSet::new().eq("is_default", true), Pagination::new(1, 1), Scope::All)
            .await
            .and_then(|page| {
                page.items.into_iter().next().ok_or_else(|| ServiceError::NotFound("No default currency is configured.".into()))
            });
        respond::<Currency, _>(Operation::Get, "default", result, "Default currency retrieved successfully".into())
    }
}
