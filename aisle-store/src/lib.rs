pub mod app_config;
pub mod database;
pub mod flight_repo;
pub mod memory_repo;
pub mod redis_repo;

pub use database::DbClient;
pub use flight_repo::PostgresFlightRepository;
pub use memory_repo::InMemoryFlightRepository;
pub use redis_repo::{RedisClient, RedisFlightLock};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Dataset error: {0}")]
    Dataset(String),
}
