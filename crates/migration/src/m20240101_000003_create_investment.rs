//! Create `investment` table.
//! An investment is owned by a user and optionally follows a pricing plan.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Investment::Table)
                    .if_not_exists()
                    .col(uuid(Investment::Id).primary_key())
                    .col(uuid(Investment::UserId).not_null())
                    .col(uuid_null(Investment::PricingId))
                    .col(uuid(Investment::CurrencyId).not_null())
                    .col(decimal_len(Investment::Amount, 20, 8).not_null())
                    .col(string_len(Investment::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Investment::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Investment::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_investment_pricing")
                            .from(Investment::Table, Investment::PricingId)
                            .to(Pricing::Table, Pricing::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_investment_currency")
                            .from(Investment::Table, Investment::CurrencyId)
                            .to(Currency::Table, Currency::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Investment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Investment { Table, Id, UserId, PricingId, CurrencyId, Amount, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Pricing { Table, Id }

#[derive(DeriveIden)]
enum Currency { Table, Id }
