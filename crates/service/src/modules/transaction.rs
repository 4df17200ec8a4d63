//! Ledger entries. Each one points at the operation it records.

use models::ledger_transaction;
use models::status::TransactionKind;
use models::validate::validate_amount;
use sea_orm::prelude::Decimal;
use sea_orm::{Order, Set};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{now, positive_amount, require_owner, stamp_owner};
use crate::errors::ServiceError;
use crate::filter::FilterField;
use crate::policy::Principal;
use crate::relation::{morph_target, parse_tag, MorphTag, Target, TransactableType};
use crate::resource::{Column, RelationRef, Resource};

pub struct Transaction;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTransaction {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[validate(custom(function = "positive_amount"))]
    pub amount: Decimal,
    #[serde(default)]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub transactable_type: String,
    pub transactable_id: Uuid,
}

/// Ledger amounts are immutable; only the description may be corrected.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTransaction {
    #[validate(length(max = 1000))]
    pub description: Option<String>,
}

impl Resource for Transaction {
    type Entity = ledger_transaction::Entity;
    type Record = ledger_transaction::Model;
    type Active = ledger_transaction::ActiveModel;
    type Create = CreateTransaction;
    type Update = UpdateTransaction;

    const MODULE: &'static str = "transaction";
    const LABEL: &'static str = "Transaction";
    const FILTERS: &'static [FilterField] = &[
        FilterField::text("kind"),
        FilterField::uuid("user_id"),
        FilterField::text("transactable_type"),
        FilterField::uuid("transactable_id"),
    ];

    fn id_column() -> Column<Self> { ledger_transaction::Column::Id }

    fn owner_column() -> Option<Column<Self>> { Some(ledger_transaction::Column::UserId) }

    fn default_order() -> (Column<Self>, Order) { (ledger_transaction::Column::CreatedAt, Order::Desc) }

    fn id(record: &ledger_transaction::Model) -> Uuid { record.id }

    fn owner(record: &ledger_transaction::Model) -> Option<Uuid> { Some(record.user_id) }

    fn build(input: CreateTransaction) -> Result<ledger_transaction::ActiveModel, ServiceError> {
        let user_id = require_owner(input.user_id)?;
        validate_amount(&input.amount)?;
        let transactable = parse_tag::<TransactableType>("transactable_type", &input.transactable_type)?;
        let now = now();
        Ok(ledger_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            amount: Set(input.amount),
            kind: Set(input.kind.unwrap_or_default().to_string()),
            description: Set(input.description),
            transactable_type: Set(transactable.tag().to_string()),
            transactable_id: Set(input.transactable_id),
            created_at: Set(now),
            updated_at: Set(now),
        })
    }

    fn apply(active: &mut ledger_transaction::ActiveModel, input: UpdateTransaction) -> Result<(), ServiceError> {
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        active.updated_at = Set(now());
        Ok(())
    }

    fn before_store(input: &mut CreateTransaction, principal: &Principal) { stamp_owner(&mut input.user_id, principal) }

    fn relations(record: &ledger_transaction::Model) -> Vec<(&'static str, RelationRef)> {
        vec![(
            "transactable",
            morph_target::<TransactableType>("transactable_type", Some(&record.transactable_type), Some(record.transactable_id)),
        )]
    }

    fn references(input: &CreateTransaction) -> Result<Vec<(&'static str, Target)>, ServiceError> {
        let tag = parse_tag::<TransactableType>("transactable_type", &input.transactable_type)?;
        Ok(vec![("transactable_id", Target::new(tag.kind(), input.transactable_id))])
    }
}
