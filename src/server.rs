//! HTTP server initialization and runtime setup.
//!
//! Handles store and abuse guard selection, migrations, background pruning
//! and the Axum server lifecycle.

use crate::application::services::LinkService;
use crate::config::{Config, StorageBackend};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::abuse_guard::{AbuseGuard, MemoryAbuseGuard, RedisAbuseGuard};
use crate::infrastructure::persistence::{MemoryLinkRepository, PgLinkRepository};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::url_policy::TargetPolicy;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - The link store (PostgreSQL with migrations, or in-memory)
/// - The creation throttle (Redis, or in-memory with a pruning task)
/// - Axum HTTP server with graceful shutdown on Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (store, store_backend) = connect_store(&config).await?;
    let abuse_guard = connect_abuse_guard(&config).await;

    let link_service = LinkService::new(
        store.clone(),
        TargetPolicy::new(config.service_domain.clone()),
        config.slug_length,
    );

    let state = AppState::new(store, store_backend, abuse_guard, link_service)
        .with_behind_proxy(config.behind_proxy)
        .with_error_details(!config.is_production());

    let app = app_router(state, &config.static_dir);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");

    Ok(())
}

async fn connect_store(config: &Config) -> Result<(Arc<dyn LinkRepository>, &'static str)> {
    match (config.storage_backend, &config.database_url) {
        (StorageBackend::Postgres, Some(database_url)) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations applied");

            Ok((Arc::new(PgLinkRepository::new(Arc::new(pool))), "postgres"))
        }
        (StorageBackend::Postgres, None) => {
            anyhow::bail!("DATABASE_URL must be set when STORAGE_BACKEND=postgres")
        }
        (StorageBackend::Memory, _) => {
            tracing::warn!("Using in-memory link store; links are lost on restart");
            Ok((Arc::new(MemoryLinkRepository::new()), "memory"))
        }
    }
}

/// Picks the shared Redis throttle when configured, falling back to the
/// in-process one if Redis is unreachable at startup.
async fn connect_abuse_guard(config: &Config) -> Arc<dyn AbuseGuard> {
    let policy = config.throttle_policy();

    if let Some(redis_url) = &config.redis_url {
        match RedisAbuseGuard::connect(redis_url, policy.clone()).await {
            Ok(guard) => {
                tracing::info!("Creation throttle enabled (Redis)");
                return Arc::new(guard);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Using in-process throttle.",
                    e
                );
            }
        }
    } else {
        tracing::info!("Creation throttle enabled (in-process)");
    }

    let guard = Arc::new(MemoryAbuseGuard::new(policy));
    spawn_pruner(guard.clone());
    guard
}

/// Drops idle throttle entries once per window so memory stays bounded by
/// the number of recently active clients.
fn spawn_pruner(guard: Arc<MemoryAbuseGuard>) {
    let period = guard.policy().window;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;

        loop {
            interval.tick().await;
            guard.prune();
            tracing::debug!(clients = guard.tracked_clients(), "Pruned throttle state");
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received");
}
