//! Create `withdrawal` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Withdrawal::Table)
                    .if_not_exists()
                    .col(uuid(Withdrawal::Id).primary_key())
                    .col(uuid(Withdrawal::UserId).not_null())
                    .col(uuid(Withdrawal::CurrencyId).not_null())
                    .col(decimal_len(Withdrawal::Amount, 20, 8).not_null())
                    .col(string_len(Withdrawal::Destination, 256).not_null())
                    .col(text_null(Withdrawal::Note))
                    .col(string_len(Withdrawal::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Withdrawal::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Withdrawal::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_withdrawal_currency")
                            .from(Withdrawal::Table, Withdrawal::CurrencyId)
                            .to(Currency::Table, Currency::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Withdrawal::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Withdrawal { Table, Id, UserId, CurrencyId, Amount, Destination, Note, Status, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Currency { Table, Id }
