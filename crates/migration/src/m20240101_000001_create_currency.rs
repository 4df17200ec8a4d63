//! Create `currency` table.
//!
//! Shared reference data; amounts elsewhere point at it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Currency::Table)
                    .if_not_exists()
                    .col(uuid(Currency::Id).primary_key())
                    .col(string_len(Currency::Name, 64).not_null())
                    .col(string_len(Currency::Symbol, 8).not_null())
                    .col(string_len(Currency::Code, 3).unique_key().not_null())
                    .col(boolean(Currency::IsDefault).not_null())
                    .col(timestamp_with_time_zone(Currency::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Currency::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Currency::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Currency { Table, Id, Name, Symbol, Code, IsDefault, CreatedAt, UpdatedAt }
