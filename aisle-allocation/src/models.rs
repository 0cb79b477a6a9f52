use aisle_core::{
    BoardingPassDetail, BoardingPassId, Flight, FlightId, Passenger, PurchaseId, Seat,
    SeatAssignment, SeatId,
};
use serde::Serialize;
use std::collections::HashMap;
use crate::error::{AllocationError, Stage};

/// Everything one allocation run reads, materialized up front
#[derive(Debug, Clone)]
pub struct FlightSnapshot {
    pub flight: Flight,
    pub boarding_passes: Vec<BoardingPassDetail>,
    pub passengers: Vec<Passenger>,
    pub available_seats: Vec<Seat>,
}

/// Boarding passes of one purchase, youngest passenger first
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseGroup {
    pub purchase_id: PurchaseId,
    pub boarding_passes: Vec<BoardingPassDetail>,
}

/// A purchase group split by age, borrowing from the group it came from
#[derive(Debug, Default)]
pub struct SegregatedGroup<'a> {
    pub adults: Vec<&'a BoardingPassDetail>,
    pub children: Vec<&'a BoardingPassDetail>,
}

impl SegregatedGroup<'_> {
    pub fn required_seats(&self) -> usize {
        self.adults.len() + self.children.len()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// All boarding passes of the flight in manifest order, indexed by id
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: Vec<BoardingPassDetail>,
    index: HashMap<BoardingPassId, usize>,
}

impl Manifest {
    pub fn new(entries: Vec<BoardingPassDetail>) -> Result<Self, AllocationError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if index.insert(entry.id(), position).is_some() {
                return Err(AllocationError::processing(
                    Stage::Grouping,
                    format!("boarding pass {} appears twice in the manifest", entry.id()),
                ));
            }
        }
        Ok(Self { entries, index })
    }

    pub fn get(&self, id: BoardingPassId) -> Option<&BoardingPassDetail> {
        self.index.get(&id).map(|&position| &self.entries[position])
    }

    pub fn get_mut(&mut self, id: BoardingPassId) -> Option<&mut BoardingPassDetail> {
        self.index.get(&id).map(|&position| &mut self.entries[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoardingPassDetail> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<BoardingPassDetail> {
        self.entries
    }
}

/// Seats still free during a run. Keeps the order it was loaded in; the adjacency
/// search reads windows of that order.
#[derive(Debug, Clone, Default)]
pub struct SeatPool {
    seats: Vec<Seat>,
    positions: HashMap<SeatId, usize>,
}

impl SeatPool {
    pub fn new(seats: Vec<Seat>) -> Self {
        let positions = seats
            .iter()
            .enumerate()
            .map(|(position, seat)| (seat.seat_id, position))
            .collect();
        Self { seats, positions }
    }

    pub fn as_slice(&self) -> &[Seat] {
        &self.seats
    }

    pub fn contains(&self, seat_id: SeatId) -> bool {
        self.positions.contains_key(&seat_id)
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Take a seat out of the pool, keeping the order of the rest
    pub fn remove(&mut self, seat_id: SeatId) -> Option<Seat> {
        let position = self.positions.remove(&seat_id)?;
        let seat = self.seats.remove(position);
        for later in &self.seats[position..] {
            if let Some(p) = self.positions.get_mut(&later.seat_id) {
                *p -= 1;
            }
        }
        Some(seat)
    }

    pub fn into_vec(self) -> Vec<Seat> {
        self.seats
    }
}

/// Accumulator folded over the purchase groups of a run
#[derive(Debug, Clone, Default)]
pub struct AllocationState {
    pub manifest: Manifest,
    pub pool: SeatPool,
}

/// Flight data after every purchase group has been through the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct AllocationResult {
    pub flight: Flight,
    pub boarding_passes: Vec<BoardingPassDetail>,
    pub available_seats: Vec<Seat>,
    pub passengers: Vec<Passenger>,
    pub grouped_boarding_passes: Vec<PurchaseGroup>,
    /// Seats newly committed by this run, in assignment order
    pub assignments: Vec<SeatAssignment>,
}

#[derive(Debug, Clone)]
pub enum AllocationOutcome {
    NotFound { flight_id: FlightId },
    Allocated(AllocationResult),
}

impl AllocationOutcome {
    pub fn found(&self) -> bool {
        matches!(self, AllocationOutcome::Allocated(_))
    }

    pub fn into_result(self) -> Option<AllocationResult> {
        match self {
            AllocationOutcome::Allocated(result) => Some(result),
            AllocationOutcome::NotFound { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::seat;

    #[test]
    fn test_pool_remove_keeps_order_and_index() {
        let mut pool = SeatPool::new(vec![
            seat(1, 10, 'A', 3),
            seat(2, 10, 'B', 3),
            seat(3, 10, 'C', 3),
            seat(4, 11, 'A', 3),
        ]);

        assert_eq!(pool.remove(2).map(|s| s.seat_id), Some(2));
        assert!(pool.remove(2).is_none());
        assert!(!pool.contains(2));

        let ids: Vec<_> = pool.as_slice().iter().map(|s| s.seat_id).collect();
        assert_eq!(ids, vec![1, 3, 4]);

        // Index still points at the right entries after the shift
        assert_eq!(pool.remove(4).map(|s| s.seat_row), Some(11));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_manifest_rejects_duplicate_ids() {
        let pass = crate::testkit::FlightBuilder::new().pass(1, 1, 30, 3).details().remove(0);
        let err = Manifest::new(vec![pass.clone(), pass]).unwrap_err();
        assert!(matches!(err, AllocationError::Processing { stage: Stage::Grouping, .. }));
    }
}
