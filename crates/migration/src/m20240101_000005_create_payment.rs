//! Create `payment` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payment::Table)
                    .if_not_exists()
                    .col(uuid(Payment::Id).primary_key())
                    .col(uuid(Payment::UserId).not_null())
                    .col(uuid(Payment::CurrencyId).not_null())
                    .col(decimal_len(Payment::Amount, 20, 8).not_null())
                    .col(string_len(Payment::Method, 32).not_null())
                    .col(string_len(Payment::Status, 32).not_null())
                    .col(string_len_null(Payment::PayableType, 32))
                    .col(uuid_null(Payment::PayableId))
                    .col(timestamp_with_time_zone(Payment::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Payment::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payment_currency")
                            .from(Payment::Table, Payment::CurrencyId)
                            .to(Currency::Table, Currency::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Payment::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Payment { Table, Id, UserId, CurrencyId, Amount, Method, Status, PayableType, PayableId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Currency { Table, Id }
