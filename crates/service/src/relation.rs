//! Polymorphic references and relation loading.
//!
//! A polymorphic reference is stored as a `(type tag, id)` pair. Each
//! reference site has a closed enum of accepted tags, so an unknown tag is
//! rejected before any write and cannot reach a lookup.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::modules::{
    currency::Currency, funding::Funding, investment::Investment, payment::Payment, pricing::Pricing,
    withdrawal::Withdrawal,
};
use crate::policy::{Principal, Scope};
use crate::repository::Repository;
use crate::resource::{RelationRef, Resource};

/// Entity kinds a relation may point at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Currency,
    Pricing,
    Investment,
    Funding,
    Payment,
    Withdrawal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl Target {
    pub fn new(kind: EntityKind, id: Uuid) -> Self { Self { kind, id } }
}

/// Closed set of tags accepted at one polymorphic reference site.
pub trait MorphTag: Copy + Sized + 'static {
    const ALL: &'static [Self];

    fn tag(&self) -> &'static str;

    fn kind(&self) -> EntityKind;

    fn from_tag(tag: &str) -> Option<Self> { Self::ALL.iter().copied().find(|t| t.tag() == tag) }
}

macro_rules! morph_tags {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $tag:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum $name { $($variant),+ }

        impl MorphTag for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn tag(&self) -> &'static str {
                match self { $($name::$variant => $tag),+ }
            }

            fn kind(&self) -> EntityKind {
                match self { $($name::$variant => EntityKind::$variant),+ }
            }
        }
    };
}

morph_tags!(
    /// What a funding tops up.
    FundableType { Investment => "investment", Pricing => "pricing" }
);

morph_tags!(
    /// What a payment settles.
    PayableType { Funding => "funding", Withdrawal => "withdrawal", Investment => "investment" }
);

morph_tags!(
    /// The operation a ledger transaction records.
    TransactableType { Funding => "funding", Payment => "payment", Withdrawal => "withdrawal" }
);

/// Parse a tag for `field`, failing with `INVALID_TYPE` when it is not in the site's set.
pub fn parse_tag<T: MorphTag>(field: &str, tag: &str) -> Result<T, ServiceError> {
    T::from_tag(tag.trim()).ok_or_else(|| ServiceError::invalid_type(field, tag))
}

/// Validate an optional `(type, id)` pair: both halves or neither.
pub fn morph_pair<T: MorphTag>(
    type_field: &str,
    id_field: &str,
    tag: Option<&str>,
    id: Option<Uuid>,
) -> Result<Option<(T, Uuid)>, ServiceError> {
    match (tag.map(str::trim).filter(|t| !t.is_empty()), id) {
        (None, None) => Ok(None),
        (Some(tag), Some(id)) => Ok(Some((parse_tag::<T>(type_field, tag)?, id))),
        (Some(_), None) => Err(ServiceError::validation_field(
            id_field,
            format!("The {} field is required when {} is present.", id_field, type_field),
        )),
        (None, Some(_)) => Err(ServiceError::validation_field(
            type_field,
            format!("The {} field is required when {} is present.", type_field, id_field),
        )),
    }
}

/// Relation slot for a stored polymorphic pair.
pub fn morph_target<T: MorphTag>(field: &str, tag: Option<&str>, id: Option<Uuid>) -> RelationRef {
    match (tag, id) {
        (Some(tag), Some(id)) => {
            let parsed = parse_tag::<T>(field, tag).inspect_err(|_| warn!(field, tag, "stored_morph_tag_unknown"))?;
            Ok(Some(Target::new(parsed.kind(), id)))
        }
        _ => Ok(None),
    }
}

/// Loads relation targets through the per-kind repositories.
pub struct RelationResolver {
    currencies: Arc<dyn Repository<Currency>>,
    pricings: Arc<dyn Repository<Pricing>>,
    investments: Arc<dyn Repository<Investment>>,
    fundings: Arc<dyn Repository<Funding>>,
    payments: Arc<dyn Repository<Payment>>,
    withdrawals: Arc<dyn Repository<Withdrawal>>,
}

impl RelationResolver {
    pub fn new(
        currencies: Arc<dyn Repository<Currency>>,
        pricings: Arc<dyn Repository<Pricing>>,
        investments: Arc<dyn Repository<Investment>>,
        fundings: Arc<dyn Repository<Funding>>,
        payments: Arc<dyn Repository<Payment>>,
        withdrawals: Arc<dyn Repository<Withdrawal>>,
    ) -> Self {
        Self { currencies, pricings, investments, fundings, payments, withdrawals }
    }

    /// Serialized target as `principal` may see it: `null` when it no longer
    /// exists or belongs to another user.
    pub async fn resolve(&self, principal: &Principal, target: Target) -> Result<Value, ServiceError> {
        match target.kind {
            EntityKind::Currency => load(self.currencies.as_ref(), principal, target.id).await,
            EntityKind::Pricing => load(self.pricings.as_ref(), principal, target.id).await,
            EntityKind::Investment => load(self.investments.as_ref(), principal, target.id).await,
            EntityKind::Funding => load(self.fundings.as_ref(), principal, target.id).await,
            EntityKind::Payment => load(self.payments.as_ref(), principal, target.id).await,
            EntityKind::Withdrawal => load(self.withdrawals.as_ref(), principal, target.id).await,
        }
    }
}

async fn load<R: Resource>(repo: &dyn Repository<R>, principal: &Principal, id: Uuid) -> Result<Value, ServiceError> {
    match repo.find(id, Scope::for_principal::<R>(principal)).await? {
        Some(record) => serde_json::to_value(record).map_err(|e| ServiceError::Internal(e.to_string())),
        None => Ok(Value::Null),
    }
}
