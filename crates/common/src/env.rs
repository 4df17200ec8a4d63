//! Environment/runtime helpers

use tracing::warn;

/// Load `.env` when present; warn when the process relies on its own environment only.
pub async fn ensure_env() {
    if tokio::fs::metadata(".env").await.is_err() {
        warn!("no .env file found; relying on process environment");
    }
    dotenvy::dotenv().ok();
}
