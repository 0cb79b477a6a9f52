use aisle_allocation::{AllocationOutcome, AllocationResult};
use aisle_core::{
    AirplaneId, BoardingPassDetail, BoardingPassId, FlightId, Masked, PassengerId, PurchaseId,
    SeatId, SeatTypeId,
};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPassengers {
    pub flight_id: FlightId,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub takeoff_date_time: DateTime<Utc>,
    pub takeoff_airport: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub landing_date_time: DateTime<Utc>,
    pub landing_airport: String,
    pub airplane_id: AirplaneId,
    pub passengers: Vec<PassengerSeat>,
}

/// One boarding pass with its passenger and seat after allocation
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerSeat {
    pub passenger_id: PassengerId,
    pub dni: Masked<String>,
    pub name: String,
    pub age: i32,
    pub country: String,
    pub boarding_pass_id: BoardingPassId,
    pub purchase_id: PurchaseId,
    pub seat_type_id: SeatTypeId,
    pub seat_id: Option<SeatId>,
}

impl From<BoardingPassDetail> for PassengerSeat {
    fn from(detail: BoardingPassDetail) -> Self {
        let BoardingPassDetail { boarding_pass, passenger, purchase, .. } = detail;
        Self {
            passenger_id: passenger.passenger_id,
            dni: passenger.dni,
            name: passenger.name,
            age: passenger.age,
            country: passenger.country,
            boarding_pass_id: boarding_pass.boarding_pass_id,
            purchase_id: purchase.purchase_id,
            seat_type_id: boarding_pass.seat_type_id,
            seat_id: boarding_pass.seat_id,
        }
    }
}

impl From<AllocationResult> for FlightPassengers {
    fn from(result: AllocationResult) -> Self {
        let flight = result.flight;
        Self {
            flight_id: flight.flight_id,
            takeoff_date_time: flight.takeoff_date_time,
            takeoff_airport: flight.takeoff_airport,
            landing_date_time: flight.landing_date_time,
            landing_airport: flight.landing_airport,
            airplane_id: flight.airplane_id,
            passengers: result.boarding_passes.into_iter().map(PassengerSeat::from).collect(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/flights/{id}/passengers", get(get_flight_passengers))
}

async fn get_flight_passengers(
    State(state): State<AppState>,
    Path(flight_id): Path<FlightId>,
) -> Result<Json<ApiResponse<FlightPassengers>>, AppError> {
    let result = match state.allocate(flight_id).await? {
        AllocationOutcome::Allocated(result) => result,
        AllocationOutcome::NotFound { flight_id } => return Err(AppError::NotFound(flight_id)),
    };

    info!(
        "Flight {} manifest served: {} passengers, {} new seats",
        flight_id,
        result.boarding_passes.len(),
        result.assignments.len()
    );

    Ok(Json(ApiResponse { code: 200, data: result.into() }))
}
