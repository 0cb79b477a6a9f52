use aisle_allocation::{AllocationError, AllocationOutcome, SeatAllocator};
use aisle_core::FlightId;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub allocator: Arc<SeatAllocator>,
    /// Upper bound on one request's allocation run
    pub run_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(allocator: SeatAllocator) -> Self {
        Self { allocator: Arc::new(allocator), run_timeout: None }
    }

    pub fn with_run_timeout(mut self, run_timeout: Option<Duration>) -> Self {
        self.run_timeout = run_timeout;
        self
    }

    pub async fn allocate(&self, flight_id: FlightId) -> Result<AllocationOutcome, AllocationError> {
        match self.run_timeout {
            Some(deadline) => self.allocator.allocate_within(flight_id, deadline).await,
            None => self.allocator.allocate(flight_id).await,
        }
    }
}
