//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_currency;
mod m20240101_000002_create_pricing;
mod m20240101_000003_create_investment;
mod m20240101_000004_create_funding;
mod m20240101_000005_create_payment;
mod m20240101_000006_create_withdrawal;
mod m20240101_000007_create_ledger_transaction;
mod m20240101_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_currency::Migration),
            Box::new(m20240101_000002_create_pricing::Migration),
            Box::new(m20240101_000003_create_investment::Migration),
            Box::new(m20240101_000004_create_funding::Migration),
            Box::new(m20240101_000005_create_payment::Migration),
            Box::new(m20240101_000006_create_withdrawal::Migration),
            Box::new(m20240101_000007_create_ledger_transaction::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000010_add_indexes::Migration),
        ]
    }
}
