use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub redis: Option<RedisConfig>,
    pub allocation: AllocationSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// JSON dataset loaded by the memory backend
    pub dataset_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 { 5 }

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LockBackend {
    Local,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AllocationSettings {
    /// Write assignments back to storage at the end of each run
    #[serde(default)]
    pub persist_assignments: bool,
    pub run_timeout_ms: Option<u64>,
    pub lock_backend: LockBackend,
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_seconds: u64,
    #[serde(default = "default_lock_wait")]
    pub lock_wait_ms: u64,
}

fn default_lock_ttl() -> u64 { 30 }
fn default_lock_wait() -> u64 { 5_000 }

impl AllocationSettings {
    pub fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_ms.map(Duration::from_millis)
    }

    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_seconds)
    }

    pub fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Environment file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `AISLE__SERVER__PORT=8080` sets `server.port`
            .add_source(config::Environment::with_prefix("AISLE").separator("__"))
            .build()?;

        let config: Config = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// A Redis lease is never renewed, so every run must end before it expires
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let allocation = &self.allocation;
        if allocation.lock_backend != LockBackend::Redis {
            return Ok(());
        }
        match allocation.run_timeout() {
            Some(timeout) if timeout < allocation.lock_ttl() => Ok(()),
            Some(timeout) => Err(config::ConfigError::Message(format!(
                "allocation.run_timeout_ms ({}ms) must be shorter than allocation.lock_ttl_seconds ({}s)",
                timeout.as_millis(),
                allocation.lock_ttl_seconds
            ))),
            None => Err(config::ConfigError::Message(
                "allocation.run_timeout_ms is required with the redis lock backend".to_string(),
            )),
        }
    }
}
