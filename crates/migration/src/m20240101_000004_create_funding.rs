//! Create `funding` table.
//! `fundable_type`/`fundable_id` hold a polymorphic reference; no FK is possible on it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Funding::Table)
                    .if_not_exists()
                    .col(uuid(Funding::Id).primary_key())
                    .col(uuid(Funding::UserId).not_null())
                    .col(uuid(Funding::CurrencyId).not_null())
                    .col(decimal_len(Funding::Amount, 20, 8).not_null())
                    .col(string_len(Funding::Status, 32).not_null())
                    .col(string_len_null(Funding::FundableType, 32))
                    .col(uuid_null(Funding::FundableId))
                    .col(timestamp_with_time_zone(Funding::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Funding::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_funding_currency")
                            .from(Funding::Table, Funding::CurrencyId)
                            .to(Currency::Table, Currency::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Funding::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Funding { Table, Id, UserId, CurrencyId, Amount, Status, FundableType, FundableId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Currency { Table, Id }
