use aisle_core::{FlightId, FlightLock, FlightRepository, PassengerId, RepositoryError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use crate::adjacency::find_adjacent_seats;
use crate::assignment::assign_seats;
use crate::error::AllocationError;
use crate::grouping::group_by_purchase;
use crate::models::{
    AllocationOutcome, AllocationResult, AllocationState, FlightSnapshot, Manifest, PurchaseGroup,
    SeatPool,
};
use crate::segregation::segregate_by_age;

/// Run the seating pipeline over a materialized flight.
///
/// Purchase groups are seated one after the other in first-seen order; each one sees
/// the pool left over by those before it. A group that finds no seats is skipped, a
/// processing fault aborts the whole run.
pub fn allocate_snapshot(snapshot: FlightSnapshot) -> Result<AllocationResult, AllocationError> {
    let FlightSnapshot { flight, boarding_passes, passengers, available_seats } = snapshot;

    let groups = group_by_purchase(flight.flight_id, &boarding_passes)?;
    let passenger_index: HashMap<PassengerId, _> = passengers.iter().map(|p| (p.passenger_id, p)).collect();

    let initial = AllocationState {
        manifest: Manifest::new(boarding_passes)?,
        pool: SeatPool::new(available_seats),
    };

    let mut assignments = Vec::new();
    let state = groups.iter().try_fold(initial, |state, group| {
        let segregated = segregate_by_age(&group.boarding_passes, &passenger_index)?;
        let seats = find_adjacent_seats(&state.pool, &segregated)?;
        let (state, made) = assign_seats(state, &group.boarding_passes, &seats);

        debug!(
            purchase_id = group.purchase_id,
            adults = segregated.adults.len(),
            children = segregated.children.len(),
            found = seats.len(),
            assigned = made.len(),
            remaining = state.pool.len(),
            "Purchase group processed"
        );
        assignments.extend(made);
        Ok::<_, AllocationError>(state)
    })?;

    let grouped_boarding_passes = regroup(&groups, &state.manifest);

    Ok(AllocationResult {
        flight,
        boarding_passes: state.manifest.into_vec(),
        available_seats: state.pool.into_vec(),
        passengers,
        grouped_boarding_passes,
        assignments,
    })
}

/// Rebuild the purchase groups from the final manifest so they carry the seats
fn regroup(groups: &[PurchaseGroup], manifest: &Manifest) -> Vec<PurchaseGroup> {
    groups
        .iter()
        .map(|group| PurchaseGroup {
            purchase_id: group.purchase_id,
            boarding_passes: group
                .boarding_passes
                .iter()
                .filter_map(|detail| manifest.get(detail.id()).cloned())
                .collect(),
        })
        .collect()
}

/// Drives allocation runs against a repository, one run per flight at a time
pub struct SeatAllocator {
    repository: Arc<dyn FlightRepository>,
    locks: Arc<dyn FlightLock>,
    persist_assignments: bool,
}

impl SeatAllocator {
    pub fn new(repository: Arc<dyn FlightRepository>, locks: Arc<dyn FlightLock>) -> Self {
        Self { repository, locks, persist_assignments: false }
    }

    /// Write each run's assignments back through the repository
    pub fn with_persistence(mut self, enabled: bool) -> Self {
        self.persist_assignments = enabled;
        self
    }

    /// Seat every purchase group of a flight.
    ///
    /// Holds the flight's lock for the whole run. An unknown flight yields
    /// [`AllocationOutcome::NotFound`] without touching seats.
    pub async fn allocate(&self, flight_id: FlightId) -> Result<AllocationOutcome, AllocationError> {
        self.locked_run(flight_id, None).await
    }

    /// [`SeatAllocator::allocate`] with a deadline on reading and seating. A run
    /// that misses it reports [`AllocationError::TimedOut`] and commits nothing.
    ///
    /// The deadline never interrupts lock handling or an ongoing commit.
    pub async fn allocate_within(
        &self,
        flight_id: FlightId,
        deadline: Duration,
    ) -> Result<AllocationOutcome, AllocationError> {
        self.locked_run(flight_id, Some(deadline)).await
    }

    async fn locked_run(
        &self,
        flight_id: FlightId,
        deadline: Option<Duration>,
    ) -> Result<AllocationOutcome, AllocationError> {
        let lease = self.locks.acquire(flight_id).await?;

        let prepared = match deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.prepare(flight_id))
                .await
                .unwrap_or_else(|_| {
                    warn!("Allocation for flight {} exceeded {:?}", flight_id, deadline);
                    Err(AllocationError::TimedOut {
                        flight_id,
                        deadline_ms: u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
                    })
                }),
            None => self.prepare(flight_id).await,
        };

        let outcome = match prepared {
            Ok(AllocationOutcome::Allocated(result)) => self.commit(flight_id, result).await,
            other => other,
        };

        if let Err(e) = self.locks.release(lease).await {
            warn!("Failed to release allocation lock for flight {}: {}", flight_id, e);
        }
        outcome
    }

    /// Load the flight and seat it in memory; nothing is written
    async fn prepare(&self, flight_id: FlightId) -> Result<AllocationOutcome, AllocationError> {
        let Some(flight) = self.repository.get_flight_by_id(flight_id).await? else {
            info!("Flight {} not found", flight_id);
            return Ok(AllocationOutcome::NotFound { flight_id });
        };

        let boarding_passes = self.repository.get_boarding_passes_by_flight_id(flight_id).await?;

        let mut seen = HashSet::new();
        let passenger_ids: Vec<PassengerId> = boarding_passes
            .iter()
            .map(|d| d.boarding_pass.passenger_id)
            .filter(|id| seen.insert(*id))
            .collect();
        let passengers = self.repository.get_passengers_by_ids(&passenger_ids).await?;

        let available_seats = self
            .repository
            .get_available_seats(flight.airplane_id, flight_id)
            .await?;

        info!(
            "Allocating flight {}: {} boarding passes, {} free seats",
            flight_id,
            boarding_passes.len(),
            available_seats.len()
        );

        let result = allocate_snapshot(FlightSnapshot {
            flight,
            boarding_passes,
            passengers,
            available_seats,
        })?;
        Ok(AllocationOutcome::Allocated(result))
    }

    async fn commit(
        &self,
        flight_id: FlightId,
        result: AllocationResult,
    ) -> Result<AllocationOutcome, AllocationError> {
        if self.persist_assignments && !result.assignments.is_empty() {
            self.repository
                .commit_assignments(flight_id, &result.assignments)
                .await
                .map_err(|e| match e {
                    RepositoryError::Conflict { .. } => {
                        warn!("Seat commit for flight {} rejected: {}", flight_id, e);
                        AllocationError::Conflict { flight_id, source: e }
                    }
                    other => AllocationError::Repository(other),
                })?;
        }

        info!(
            "Flight {} allocated: {} seats assigned, {} left",
            flight_id,
            result.assignments.len(),
            result.available_seats.len()
        );
        Ok(AllocationOutcome::Allocated(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aisle_core::{BoardingPassDetail, SeatId};
    use crate::testkit::{FlightBuilder, ECONOMY, FIRST_CLASS, PREMIUM};

    fn seat_of(result: &AllocationResult, boarding_pass_id: i64) -> Option<SeatId> {
        result
            .boarding_passes
            .iter()
            .find(|d| d.id() == boarding_pass_id)
            .and_then(|d| d.boarding_pass.seat_id)
    }

    fn labels(details: &[BoardingPassDetail]) -> Vec<String> {
        details
            .iter()
            .map(|d| d.seat.as_ref().map(|s| s.label()).unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_three_adults_take_one_row_in_age_order() {
        let snapshot = FlightBuilder::new()
            .seat(1, 10, 'A', ECONOMY)
            .seat(2, 10, 'B', ECONOMY)
            .seat(3, 10, 'C', ECONOMY)
            .pass(1, 10, 52, ECONOMY)
            .pass(2, 10, 23, ECONOMY)
            .pass(3, 10, 37, ECONOMY)
            .snapshot();

        let result = allocate_snapshot(snapshot).unwrap();

        assert_eq!(seat_of(&result, 2), Some(1));
        assert_eq!(seat_of(&result, 3), Some(2));
        assert_eq!(seat_of(&result, 1), Some(3));
        assert!(result.available_seats.is_empty());
        assert_eq!(labels(&result.grouped_boarding_passes[0].boarding_passes), vec!["10A", "10B", "10C"]);
    }

    #[test]
    fn test_adult_and_child_without_shared_type_get_nothing() {
        let snapshot = FlightBuilder::new()
            .seat(1, 1, 'A', FIRST_CLASS)
            .seat(2, 1, 'B', FIRST_CLASS)
            .seat(3, 20, 'A', ECONOMY)
            .seat(4, 20, 'B', ECONOMY)
            .pass(1, 10, 40, ECONOMY)
            .pass(2, 10, 7, FIRST_CLASS)
            .snapshot();

        let result = allocate_snapshot(snapshot).unwrap();

        assert!(result.assignments.is_empty());
        assert_eq!(result.available_seats.len(), 4);
        assert_eq!(seat_of(&result, 1), None);
        assert_eq!(seat_of(&result, 2), None);
    }

    #[test]
    fn test_adult_and_child_share_a_row() {
        let snapshot = FlightBuilder::new()
            .seat(1, 15, 'A', PREMIUM)
            .seat(2, 15, 'B', PREMIUM)
            .seat(3, 15, 'C', PREMIUM)
            .pass(1, 10, 41, PREMIUM)
            .pass(2, 10, 6, PREMIUM)
            .snapshot();

        let result = allocate_snapshot(snapshot).unwrap();

        // Youngest first: the child sits at the first seat of the run
        assert_eq!(seat_of(&result, 2), Some(1));
        assert_eq!(seat_of(&result, 1), Some(2));
        assert_eq!(result.available_seats.len(), 1);
    }

    #[test]
    fn test_two_adults_fall_back_to_nearest_rows() {
        let snapshot = FlightBuilder::new()
            .seat(1, 3, 'A', ECONOMY)
            .seat(2, 8, 'B', ECONOMY)
            .seat(3, 9, 'C', ECONOMY)
            .pass(1, 10, 30, ECONOMY)
            .pass(2, 10, 33, ECONOMY)
            .snapshot();

        let result = allocate_snapshot(snapshot).unwrap();

        assert_eq!(seat_of(&result, 1), Some(2));
        assert_eq!(seat_of(&result, 2), Some(3));
    }

    #[test]
    fn test_preassigned_pass_keeps_its_seat() {
        let snapshot = FlightBuilder::new()
            .seat(1, 10, 'A', ECONOMY)
            .seat(2, 10, 'B', ECONOMY)
            .seat(3, 10, 'C', ECONOMY)
            .seat(4, 10, 'D', ECONOMY)
            .seated_pass(1, 10, 30, ECONOMY, 1)
            .pass(2, 10, 35, ECONOMY)
            .pass(3, 10, 40, ECONOMY)
            .snapshot();

        // Seat 1 is referenced, so it never reaches the pool
        assert!(snapshot.available_seats.iter().all(|s| s.seat_id != 1));

        let result = allocate_snapshot(snapshot).unwrap();

        assert_eq!(seat_of(&result, 1), Some(1));
        assert_eq!(result.assignments.len(), 2);
        assert!(result.assignments.iter().all(|a| a.boarding_pass_id != 1 && a.seat_id != 1));
    }

    #[test]
    fn test_earlier_purchase_gets_the_row() {
        let builder = |first: i64, second: i64| {
            FlightBuilder::new()
                .seat(1, 10, 'A', ECONOMY)
                .seat(2, 10, 'B', ECONOMY)
                .seat(3, 12, 'B', ECONOMY)
                .seat(4, 14, 'C', ECONOMY)
                .pass(first, first, 30, ECONOMY)
                .pass(first + 1, first, 31, ECONOMY)
                .pass(second, second, 40, ECONOMY)
                .pass(second + 1, second, 41, ECONOMY)
        };

        let result = allocate_snapshot(builder(100, 200).snapshot()).unwrap();
        assert_eq!(seat_of(&result, 100), Some(1));
        assert_eq!(seat_of(&result, 200), Some(3));

        // Register purchase 200 first and it takes row 10 instead
        let result = allocate_snapshot(builder(200, 100).snapshot()).unwrap();
        assert_eq!(seat_of(&result, 200), Some(1));
        assert_eq!(seat_of(&result, 100), Some(3));
    }

    #[test]
    fn test_group_without_seats_does_not_block_the_next() {
        let snapshot = FlightBuilder::new()
            .seat(1, 10, 'A', ECONOMY)
            .pass(1, 10, 30, FIRST_CLASS)
            .pass(2, 20, 30, ECONOMY)
            .snapshot();

        let result = allocate_snapshot(snapshot).unwrap();
        assert_eq!(seat_of(&result, 1), None);
        assert_eq!(seat_of(&result, 2), Some(1));
    }

    #[test]
    fn test_fault_aborts_the_run() {
        let mut snapshot = FlightBuilder::new().seat(1, 10, 'A', ECONOMY).pass(1, 10, 30, ECONOMY).snapshot();
        snapshot.passengers[0].age = -3;

        let err = allocate_snapshot(snapshot).unwrap_err();
        assert!(matches!(err, AllocationError::Processing { .. }));
    }
}
