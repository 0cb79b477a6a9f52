use async_trait::async_trait;
use crate::models::{
    AirplaneId, BoardingPassDetail, BoardingPassId, Flight, FlightId, Passenger, PassengerId,
    Seat, SeatAssignment, SeatId,
};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Data store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("Seat {seat_id} is no longer free for boarding pass {boarding_pass_id}")]
    Conflict {
        boarding_pass_id: BoardingPassId,
        seat_id: SeatId,
    },
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository trait for the flight manifest an allocation run reads from
#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn get_flight_by_id(&self, flight_id: FlightId) -> RepositoryResult<Option<Flight>>;

    async fn get_boarding_passes_by_flight_id(
        &self,
        flight_id: FlightId,
    ) -> RepositoryResult<Vec<BoardingPassDetail>>;

    async fn get_passengers_by_ids(
        &self,
        passenger_ids: &[PassengerId],
    ) -> RepositoryResult<Vec<Passenger>>;

    /// Seats of `airplane_id` not referenced by any boarding pass of `flight_id`,
    /// ordered by seat id.
    async fn get_available_seats(
        &self,
        airplane_id: AirplaneId,
        flight_id: FlightId,
    ) -> RepositoryResult<Vec<Seat>>;

    /// Write a run's assignments all-or-nothing. Each one must still find its pass
    /// unseated and its seat unreferenced on the flight, otherwise the whole batch is
    /// rejected with [`RepositoryError::Conflict`].
    async fn commit_assignments(
        &self,
        flight_id: FlightId,
        assignments: &[SeatAssignment],
    ) -> RepositoryResult<()>;
}
