use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::currency;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "withdrawal")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub currency_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub amount: Decimal,
    pub destination: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Currency }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Currency => Entity::belongs_to(currency::Entity)
                .from(Column::CurrencyId)
                .to(currency::Column::Id)
                .into(),
        }
    }
}

impl Related<currency::Entity> for Entity {
    fn to() -> RelationDef { Relation::Currency.def() }
}

impl ActiveModelBehavior for ActiveModel {}
