use aisle_core::{FlightId, FlightLease, FlightLock, LockError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// In-process flight locks for a single service instance.
///
/// One mutex per flight, created on first use and dropped once nobody holds or waits
/// for it.
#[derive(Default)]
pub struct LocalFlightLocks {
    flights: Mutex<HashMap<FlightId, Arc<Mutex<()>>>>,
    wait: Option<Duration>,
}

impl LocalFlightLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up with [`LockError::Contended`] after waiting this long
    pub fn with_wait_limit(mut self, wait: Duration) -> Self {
        self.wait = Some(wait);
        self
    }

    /// Flights with a live lock entry
    pub async fn tracked(&self) -> usize {
        self.flights.lock().await.len()
    }
}

#[async_trait]
impl FlightLock for LocalFlightLocks {
    async fn acquire(&self, flight_id: FlightId) -> Result<FlightLease, LockError> {
        let slot = {
            let mut flights = self.flights.lock().await;
            flights.entry(flight_id).or_default().clone()
        };

        let started = Instant::now();
        let guard = match self.wait {
            Some(wait) => tokio::time::timeout(wait, slot.lock_owned())
                .await
                .map_err(|_| LockError::Contended {
                    flight_id,
                    waited_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                })?,
            None => slot.lock_owned().await,
        };

        Ok(FlightLease::new(flight_id, format!("local:{}", flight_id)).with_guard(guard))
    }

    async fn release(&self, lease: FlightLease) -> Result<(), LockError> {
        let flight_id = lease.flight_id;
        drop(lease);

        let mut flights = self.flights.lock().await;
        if flights.get(&flight_id).is_some_and(|slot| Arc::strong_count(slot) == 1) {
            flights.remove(&flight_id);
        }
        Ok(())
    }
}
