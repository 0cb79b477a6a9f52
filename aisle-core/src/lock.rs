use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use crate::models::FlightId;

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Flight {flight_id} is being allocated elsewhere (waited {waited_ms}ms)")]
    Contended { flight_id: FlightId, waited_ms: u64 },

    #[error("Lock backend failure: {0}")]
    Backend(String),
}

/// Proof that the holder is the only allocation run for a flight.
///
/// Backends that hold an in-process guard park it in `guard`; dropping the lease
/// releases such guards.
pub struct FlightLease {
    pub flight_id: FlightId,
    pub token: String,
    guard: Option<Box<dyn Any + Send + Sync>>,
}

impl FlightLease {
    pub fn new(flight_id: FlightId, token: impl Into<String>) -> Self {
        Self { flight_id, token: token.into(), guard: None }
    }

    pub fn with_guard<G: Any + Send + Sync>(mut self, guard: G) -> Self {
        self.guard = Some(Box::new(guard));
        self
    }

    pub fn holds_guard(&self) -> bool {
        self.guard.is_some()
    }
}

impl fmt::Debug for FlightLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlightLease")
            .field("flight_id", &self.flight_id)
            .field("token", &self.token)
            .field("guarded", &self.guard.is_some())
            .finish()
    }
}

/// Serializes allocation runs per flight. Runs for different flights never wait on
/// each other.
#[async_trait]
pub trait FlightLock: Send + Sync {
    async fn acquire(&self, flight_id: FlightId) -> Result<FlightLease, LockError>;

    async fn release(&self, lease: FlightLease) -> Result<(), LockError>;
}
