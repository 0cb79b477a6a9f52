pub mod error;
pub mod models;
pub mod grouping;
pub mod segregation;
pub mod adjacency;
pub mod assignment;
pub mod orchestrator;
pub mod lock;

#[cfg(test)]
mod testkit;
#[cfg(test)]
mod properties;

pub use error::{AllocationError, Stage};
pub use models::{
    AllocationOutcome, AllocationResult, AllocationState, FlightSnapshot, Manifest, PurchaseGroup,
    SeatPool, SegregatedGroup,
};
pub use grouping::group_by_purchase;
pub use segregation::{segregate_by_age, ADULT_AGE};
pub use adjacency::find_adjacent_seats;
pub use assignment::assign_seats;
pub use orchestrator::{allocate_snapshot, SeatAllocator};
pub use lock::LocalFlightLocks;
