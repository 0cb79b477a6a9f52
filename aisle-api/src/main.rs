use aisle_allocation::{LocalFlightLocks, SeatAllocator};
use aisle_api::{app, AppState};
use aisle_core::{FlightLock, FlightRepository};
use aisle_store::app_config::{Config, LockBackend, StorageBackend};
use aisle_store::{DbClient, InMemoryFlightRepository, PostgresFlightRepository, RedisClient, RedisFlightLock};
use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aisle_api=debug,aisle_allocation=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Aisle API on port {}", config.server.port);

    let repository = build_repository(&config).await?;
    let locks = build_locks(&config).await?;

    let allocator = SeatAllocator::new(repository, locks)
        .with_persistence(config.allocation.persist_assignments);
    let state = AppState::new(allocator).with_run_timeout(config.allocation.run_timeout());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn build_repository(config: &Config) -> anyhow::Result<Arc<dyn FlightRepository>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .context("storage.backend = \"postgres\" needs a [database] section")?;
            let db = DbClient::new(database).await.context("Failed to connect to Postgres")?;
            if database.run_migrations {
                db.migrate().await?;
            }
            Ok(Arc::new(PostgresFlightRepository::new(db.pool)))
        }
        StorageBackend::Memory => {
            let path = config
                .storage
                .dataset_path
                .as_deref()
                .context("storage.backend = \"memory\" needs storage.dataset_path")?;
            Ok(Arc::new(InMemoryFlightRepository::from_json_file(path).await?))
        }
    }
}

async fn build_locks(config: &Config) -> anyhow::Result<Arc<dyn FlightLock>> {
    let settings = &config.allocation;
    match settings.lock_backend {
        LockBackend::Local => Ok(Arc::new(
            LocalFlightLocks::new().with_wait_limit(settings.lock_wait()),
        )),
        LockBackend::Redis => {
            let redis = config
                .redis
                .as_ref()
                .context("allocation.lock_backend = \"redis\" needs a [redis] section")?;
            let client = RedisClient::new(&redis.url).await.context("Failed to connect to Redis")?;
            Ok(Arc::new(RedisFlightLock::new(client, settings.lock_ttl(), settings.lock_wait())))
        }
    }
}
