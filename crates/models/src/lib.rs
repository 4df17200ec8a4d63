//! Persisted entities of the back office, one sea-orm module per table,
//! plus the status enums and field validation they share.

pub mod errors;
pub mod db;
pub mod status;
pub mod validate;

pub mod currency;
pub mod pricing;
pub mod investment;
pub mod funding;
pub mod payment;
pub mod withdrawal;
pub mod ledger_transaction;
