//! Create `ledger_transaction` table.
//! Each row points at the record that caused it through `transactable_type`/`transactable_id`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LedgerTransaction::Table)
                    .if_not_exists()
                    .col(uuid(LedgerTransaction::Id).primary_key())
                    .col(uuid(LedgerTransaction::UserId).not_null())
                    .col(decimal_len(LedgerTransaction::Amount, 20, 8).not_null())
                    .col(string_len(LedgerTransaction::Kind, 16).not_null())
                    .col(text_null(LedgerTransaction::Description))
                    .col(string_len(LedgerTransaction::TransactableType, 32).not_null())
                    .col(uuid(LedgerTransaction::TransactableId).not_null())
                    .col(timestamp_with_time_zone(LedgerTransaction::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(LedgerTransaction::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LedgerTransaction::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum LedgerTransaction { Table, Id, UserId, Amount, Kind, Description, TransactableType, TransactableId, CreatedAt, UpdatedAt }
