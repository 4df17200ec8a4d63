use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Owner-scoped listings filter by `user_id` and sort by `created_at`.
const OWNED_TABLES: [&str; 5] = ["investment", "funding", "payment", "withdrawal", "ledger_transaction"];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in OWNED_TABLES {
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(format!("idx_{table}_user_created"))
                        .table(Alias::new(table))
                        .col(Alias::new("user_id"))
                        .col(Alias::new("created_at"))
                        .to_owned(),
                )
                .await?;
        }

        // Polymorphic lookups: (type, id)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ledger_transaction_transactable")
                    .table(Alias::new("ledger_transaction"))
                    .col(Alias::new("transactable_type"))
                    .col(Alias::new("transactable_id"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_currency_is_default")
                    .table(Alias::new("currency"))
                    .col(Alias::new("is_default"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_currency_is_default").table(Alias::new("currency")).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_ledger_transaction_transactable")
                    .table(Alias::new("ledger_transaction"))
                    .to_owned(),
            )
            .await?;
        for table in OWNED_TABLES {
            manager
                .drop_index(
                    Index::drop()
                        .name(format!("idx_{table}_user_created"))
                        .table(Alias::new(table))
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }
}
