use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use crate::models::{
    AirplaneId, BoardingPass, BoardingPassDetail, Flight, FlightId, Passenger, PassengerId,
    Purchase, Seat, SeatAssignment, SeatType,
};
use crate::repository::{RepositoryError, RepositoryResult};

/// Normalized snapshot of the flight tables, as stored.
///
/// Backs the in-memory repository and JSON fixtures; joins here mirror the SQL
/// the Postgres repository runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub flights: Vec<Flight>,
    #[serde(default)]
    pub seat_types: Vec<SeatType>,
    #[serde(default)]
    pub seats: Vec<Seat>,
    #[serde(default)]
    pub passengers: Vec<Passenger>,
    #[serde(default)]
    pub purchases: Vec<Purchase>,
    #[serde(default)]
    pub boarding_passes: Vec<BoardingPass>,
}

impl Dataset {
    pub fn flight(&self, flight_id: FlightId) -> Option<&Flight> {
        self.flights.iter().find(|f| f.flight_id == flight_id)
    }

    /// Boarding passes of a flight joined with their references, in insertion order
    pub fn boarding_pass_details(&self, flight_id: FlightId) -> RepositoryResult<Vec<BoardingPassDetail>> {
        let flight = match self.flight(flight_id) {
            Some(flight) => flight,
            None => return Ok(Vec::new()),
        };

        let seats: HashMap<_, _> = self.seats.iter().map(|s| (s.seat_id, s)).collect();
        let passengers: HashMap<_, _> = self.passengers.iter().map(|p| (p.passenger_id, p)).collect();
        let purchases: HashMap<_, _> = self.purchases.iter().map(|p| (p.purchase_id, p)).collect();
        let seat_types: HashMap<_, _> = self.seat_types.iter().map(|t| (t.seat_type_id, t)).collect();

        self.boarding_passes
            .iter()
            .filter(|bp| bp.flight_id == flight_id)
            .map(|bp| -> RepositoryResult<BoardingPassDetail> {
                let missing = |what: &str, id: i64| {
                    RepositoryError::Malformed(format!(
                        "boarding pass {} references unknown {} {}",
                        bp.boarding_pass_id, what, id
                    ))
                };

                let seat = match bp.seat_id {
                    Some(seat_id) => Some((*seats.get(&seat_id).ok_or_else(|| missing("seat", seat_id))?).clone()),
                    None => None,
                };

                Ok(BoardingPassDetail {
                    boarding_pass: bp.clone(),
                    flight: flight.clone(),
                    seat,
                    passenger: (*passengers.get(&bp.passenger_id).ok_or_else(|| missing("passenger", bp.passenger_id))?).clone(),
                    purchase: (*purchases.get(&bp.purchase_id).ok_or_else(|| missing("purchase", bp.purchase_id))?).clone(),
                    seat_type: (*seat_types.get(&bp.seat_type_id).ok_or_else(|| missing("seat type", bp.seat_type_id))?).clone(),
                })
            })
            .collect()
    }

    pub fn passengers_by_ids(&self, passenger_ids: &[PassengerId]) -> Vec<Passenger> {
        let wanted: HashSet<_> = passenger_ids.iter().copied().collect();
        self.passengers
            .iter()
            .filter(|p| wanted.contains(&p.passenger_id))
            .cloned()
            .collect()
    }

    /// Seats of the airplane no boarding pass of the flight references, by seat id
    pub fn available_seats(&self, airplane_id: AirplaneId, flight_id: FlightId) -> Vec<Seat> {
        let taken: HashSet<_> = self
            .boarding_passes
            .iter()
            .filter(|bp| bp.flight_id == flight_id)
            .filter_map(|bp| bp.seat_id)
            .collect();

        let mut seats: Vec<Seat> = self
            .seats
            .iter()
            .filter(|s| s.airplane_id == airplane_id && !taken.contains(&s.seat_id))
            .cloned()
            .collect();
        seats.sort_by_key(|s| s.seat_id);
        seats
    }

    /// Compare-and-set write of a batch of assignments. Nothing is written unless
    /// every pass is still unseated and every seat is still free on the flight.
    pub fn apply_assignments(&mut self, flight_id: FlightId, assignments: &[SeatAssignment]) -> RepositoryResult<()> {
        let mut taken: HashSet<_> = self
            .boarding_passes
            .iter()
            .filter(|bp| bp.flight_id == flight_id)
            .filter_map(|bp| bp.seat_id)
            .collect();

        let mut positions = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let conflict = RepositoryError::Conflict {
                boarding_pass_id: assignment.boarding_pass_id,
                seat_id: assignment.seat_id,
            };

            let position = self
                .boarding_passes
                .iter()
                .position(|bp| bp.boarding_pass_id == assignment.boarding_pass_id && bp.flight_id == flight_id)
                .ok_or_else(|| RepositoryError::Malformed(format!(
                    "boarding pass {} is not on flight {}",
                    assignment.boarding_pass_id, flight_id
                )))?;

            if self.boarding_passes[position].seat_id.is_some() || !taken.insert(assignment.seat_id) {
                return Err(conflict);
            }
            positions.push((position, assignment.seat_id));
        }

        for (position, seat_id) in positions {
            self.boarding_passes[position].seat_id = Some(seat_id);
        }
        Ok(())
    }
}
