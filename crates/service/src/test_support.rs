#![cfg(test)]
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use migration::MigratorTrait;
use models::db::{connect_with_config, DatabaseConfig};
use models::{currency, withdrawal};
use sea_orm::prelude::Decimal;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::app::{Repositories, Services};
use crate::events::mock::RecordingSink;
use crate::modules::withdrawal::CreateWithdrawal;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn db_config() -> Option<DatabaseConfig> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let url = std::env::var("DATABASE_URL").ok()?;
    Some(DatabaseConfig {
        url,
        max_connections: 10,
        min_connections: 1,
        connect_timeout_secs: 10,
        idle_timeout_secs: 60,
        acquire_timeout_secs: 10,
        ..Default::default()
    })
}

/// Fresh connection for the current test's runtime, or `None` to skip.
pub async fn get_db() -> Option<DatabaseConnection> {
    let cfg = db_config()?;
    let migrated = *MIGRATED
        .get_or_init(|| async {
            match connect_with_config(&cfg).await {
                Ok(db) => migration::Migrator::up(&db, None).await.is_ok(),
                Err(_) => false,
            }
        })
        .await;
    if !migrated {
        eprintln!("skip: database unavailable or migrations failed");
        return None;
    }
    connect_with_config(&cfg).await.ok()
}

pub fn services() -> (Services, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    (Services::build(Repositories::in_memory(), sink.clone()), sink)
}

pub fn amount(text: &str) -> Decimal { Decimal::from_str(text).unwrap() }

pub fn create_withdrawal(user_id: Uuid) -> CreateWithdrawal {
    CreateWithdrawal {
        user_id: Some(user_id),
        currency_id: Uuid::new_v4(),
        amount: amount("250.00"),
        destination: "GB29NWBK60161331926819".into(),
        note: None,
    }
}

pub fn withdrawal_record(user_id: Uuid, status: &str) -> withdrawal::Model {
    let now = Utc::now().into();
    withdrawal::Model {
        id: Uuid::new_v4(),
        user_id,
        currency_id: Uuid::new_v4(),
        amount: amount("10"),
        destination: "DE89370400440532013000".into(),
        note: None,
        status: status.into(),
        created_at: now,
        updated_at: now,
    }
}

pub fn currency_record(code: &str, is_default: bool) -> currency::Model {
    let now = Utc::now().into();
    currency::Model {
        id: Uuid::new_v4(),
        name: format!("{} currency", code),
        symbol: code.chars().take(1).collect(),
        code: code.into(),
        is_default,
        created_at: now,
        updated_at: now,
    }
}
