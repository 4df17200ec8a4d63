//! Create `pricing` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pricing::Table)
                    .if_not_exists()
                    .col(uuid(Pricing::Id).primary_key())
                    .col(string_len(Pricing::Name, 128).not_null())
                    .col(uuid(Pricing::CurrencyId).not_null())
                    .col(decimal_len(Pricing::Amount, 20, 8).not_null())
                    .col(string_len(Pricing::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Pricing::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Pricing::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pricing_currency")
                            .from(Pricing::Table, Pricing::CurrencyId)
                            .to(Currency::Table, Currency::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Pricing::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Pricing { Table, Id, Name, CurrencyId, Amount, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Currency { Table, Id }
