use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{currency, pricing};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub pricing_id: Option<Uuid>,
    pub currency_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((20, 8)))")]
    pub amount: Decimal,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Pricing, Currency }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Pricing => Entity::belongs_to(pricing::Entity)
                .from(Column::PricingId)
                .to(pricing::Column::Id)
                .into(),
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

impl Related<pricing::Entity> for Entity {
    fn to() -> RelationDef { Relation::Pricing.def() }
}

impl ActiveModelBehavior for ActiveModel {}
