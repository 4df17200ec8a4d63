use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use configs::{AppConfig, DatabaseConfig, ServerConfig};
use migration::MigratorTrait;
use service::events::{event_channel, LogListener};
use service::{Repositories, Services};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(server: &ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address {}:{}: {}", server.host, server.port, e)))
}

/// Postgres-backed repositories, or in-memory ones for `memory://`.
pub async fn build_repositories(database: &DatabaseConfig) -> anyhow::Result<Repositories> {
    if database.is_memory() {
        warn!("using in-memory repositories; data is lost on shutdown");
        return Ok(Repositories::in_memory());
    }
    let db = models::db::connect_with_config(database).await?;
    if database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!("migrations_applied");
    }
    Ok(Repositories::sea_orm(db))
}

/// Assemble the router over already-built services.
pub fn build_app(services: Arc<Services>, cfg: &AppConfig) -> Router {
    routes::build_router(AppState::new(services, cfg), build_cors())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl_c");
        std::future::pending::<()>().await;
    }
    info!("shutdown_signal_received");
}

/// Public entry: wire repositories, services and the event dispatcher, then serve HTTP
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    common::env::ensure_env().await;

    let repos = build_repositories(&cfg.database).await?;

    let (bus, mut dispatcher) = event_channel(cfg.events.max_attempts, Duration::from_millis(cfg.events.retry_backoff_ms));
    dispatcher.register(Arc::new(LogListener));
    let dispatcher_task = tokio::spawn(dispatcher.run());

    let services = Arc::new(Services::build(repos, Arc::new(bus)));
    let app = build_app(services, &cfg);

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, "starting server");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    // The router owned the last bus handle; give the dispatcher a moment to drain.
    if tokio::time::timeout(Duration::from_secs(5), dispatcher_task).await.is_err() {
        warn!("event dispatcher did not drain before shutdown");
    }
    info!("server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::repository::Repository;

    #[test]
    fn bind_addr_rejects_bad_hosts() {
        let ok = ServerConfig { host: "127.0.0.1".into(), port: 8080, worker_threads: None };
        assert_eq!(bind_addr(&ok).unwrap().port(), 8080);
        let bad = ServerConfig { host: "not a host".into(), port: 8080, worker_threads: None };
        assert!(matches!(bind_addr(&bad), Err(StartupError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn memory_url_selects_in_memory_repositories() {
        let cfg = DatabaseConfig { url: "memory://".into(), ..Default::default() };
        let repos = build_repositories(&cfg).await.unwrap();
        assert_eq!(repos.fundings.count(&Default::default(), service::policy::Scope::All).await.unwrap(), 0);
    }
}
