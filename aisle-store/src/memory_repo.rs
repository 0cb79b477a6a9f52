use aisle_core::{
    AirplaneId, BoardingPassDetail, Dataset, Flight, FlightId, FlightRepository, Passenger,
    PassengerId, RepositoryResult, Seat, SeatAssignment,
};
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::info;
use crate::StoreError;

/// Repository over a [`Dataset`] held in memory. Used for demos, local runs and
/// tests; commits land in the dataset and are visible to later reads.
pub struct InMemoryFlightRepository {
    dataset: RwLock<Dataset>,
}

impl InMemoryFlightRepository {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset: RwLock::new(dataset) }
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Dataset(format!("{}: {}", path.display(), e)))?;
        let dataset: Dataset = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Dataset(format!("{}: {}", path.display(), e)))?;

        info!(
            "Loaded dataset from {} ({} flights, {} boarding passes)",
            path.display(),
            dataset.flights.len(),
            dataset.boarding_passes.len()
        );
        Ok(Self::new(dataset))
    }

    pub async fn snapshot(&self) -> Dataset {
        self.dataset.read().await.clone()
    }
}

#[async_trait]
impl FlightRepository for InMemoryFlightRepository {
    async fn get_flight_by_id(&self, flight_id: FlightId) -> RepositoryResult<Option<Flight>> {
        Ok(self.dataset.read().await.flight(flight_id).cloned())
    }

    async fn get_boarding_passes_by_flight_id(
        &self,
        flight_id: FlightId,
    ) -> RepositoryResult<Vec<BoardingPassDetail>> {
        self.dataset.read().await.boarding_pass_details(flight_id)
    }

    async fn get_passengers_by_ids(
        &self,
        passenger_ids: &[PassengerId],
    ) -> RepositoryResult<Vec<Passenger>> {
        Ok(self.dataset.read().await.passengers_by_ids(passenger_ids))
    }

    async fn get_available_seats(
        &self,
        airplane_id: AirplaneId,
        flight_id: FlightId,
    ) -> RepositoryResult<Vec<Seat>> {
        Ok(self.dataset.read().await.available_seats(airplane_id, flight_id))
    }

    async fn commit_assignments(
        &self,
        flight_id: FlightId,
        assignments: &[SeatAssignment],
    ) -> RepositoryResult<()> {
        self.dataset.write().await.apply_assignments(flight_id, assignments)
    }
}
