use aisle_core::{FlightId, FlightLease, FlightLock, LockError};
use async_trait::async_trait;
use redis::RedisResult;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    fn lock_key(flight_id: FlightId) -> String {
        format!("flight:{}:allocation", flight_id)
    }

    /// SET NX PX. True when `token` now owns the flight.
    pub async fn acquire_flight_lock(&self, flight_id: FlightId, token: &str, ttl_ms: u64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::lock_key(flight_id);

        let result: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(token)
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async(&mut conn)
            .await?;

        Ok(result.is_some())
    }

    /// Deletes the key only while it still carries `token`. An expired lease
    /// that another run has since taken over is left alone.
    pub async fn release_flight_lock(&self, flight_id: FlightId, token: &str) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::lock_key(flight_id);

        let script = redis::Script::new(r#"
            if redis.call("GET", KEYS[1]) == ARGV[1] then
                return redis.call("DEL", KEYS[1])
            else
                return 0
            end
        "#);

        let deleted: i64 = script.key(key).arg(token).invoke_async(&mut conn).await?;
        Ok(deleted == 1)
    }
}

/// Flight lock shared by every service instance pointed at the same Redis.
pub struct RedisFlightLock {
    redis: RedisClient,
    ttl: Duration,
    wait: Duration,
    retry_interval: Duration,
}

impl RedisFlightLock {
    pub fn new(redis: RedisClient, ttl: Duration, wait: Duration) -> Self {
        Self {
            redis,
            ttl,
            wait,
            retry_interval: Duration::from_millis(50),
        }
    }

    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn backend(e: redis::RedisError) -> LockError {
    LockError::Backend(e.to_string())
}

#[async_trait]
impl FlightLock for RedisFlightLock {
    async fn acquire(&self, flight_id: FlightId) -> Result<FlightLease, LockError> {
        let token = uuid::Uuid::new_v4().to_string();
        let ttl_ms = millis(self.ttl);
        let started = Instant::now();

        loop {
            if self.redis.acquire_flight_lock(flight_id, &token, ttl_ms).await.map_err(backend)? {
                debug!("Acquired allocation lock for flight {} ({})", flight_id, token);
                return Ok(FlightLease::new(flight_id, token));
            }

            let waited = started.elapsed();
            if waited >= self.wait {
                warn!("Gave up waiting for allocation lock on flight {}", flight_id);
                return Err(LockError::Contended {
                    flight_id,
                    waited_ms: millis(waited),
                });
            }
            tokio::time::sleep(self.retry_interval.min(self.wait - waited)).await;
        }
    }

    async fn release(&self, lease: FlightLease) -> Result<(), LockError> {
        let released = self
            .redis
            .release_flight_lock(lease.flight_id, &lease.token)
            .await
            .map_err(backend)?;

        if !released {
            warn!(
                "Allocation lock for flight {} had expired before release; the run was not exclusive",
                lease.flight_id
            );
        }
        Ok(())
    }
}
