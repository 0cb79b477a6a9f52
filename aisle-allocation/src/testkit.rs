//! Manifest builders shared by the unit tests of this crate.

use aisle_core::{
    BoardingPass, BoardingPassDetail, BoardingPassId, Dataset, Flight, Masked, Passenger,
    PurchaseId, Purchase, Seat, SeatId, SeatType, SeatTypeId,
};
use chrono::DateTime;
use crate::models::FlightSnapshot;

pub const FIRST_CLASS: SeatTypeId = 1;
pub const PREMIUM: SeatTypeId = 2;
pub const ECONOMY: SeatTypeId = 3;

pub fn seat(seat_id: SeatId, row: i32, column: char, seat_type_id: SeatTypeId) -> Seat {
    Seat { seat_id, airplane_id: 1, seat_row: row, seat_column: column, seat_type_id }
}

pub struct FlightBuilder {
    dataset: Dataset,
}

impl FlightBuilder {
    pub fn new() -> Self {
        let dataset = Dataset {
            flights: vec![Flight {
                flight_id: 1,
                takeoff_date_time: DateTime::from_timestamp(1688207580, 0).unwrap(),
                takeoff_airport: "Aeropuerto Internacional Arturo Merino Benitez, Chile".to_string(),
                landing_date_time: DateTime::from_timestamp(1688221980, 0).unwrap(),
                landing_airport: "Aeropuerto Internacional Jorge Chávez, Perú".to_string(),
                airplane_id: 1,
            }],
            seat_types: vec![
                SeatType { seat_type_id: FIRST_CLASS, name: "Primera clase".to_string() },
                SeatType { seat_type_id: PREMIUM, name: "Clase económica premium".to_string() },
                SeatType { seat_type_id: ECONOMY, name: "Clase económica".to_string() },
            ],
            ..Dataset::default()
        };
        Self { dataset }
    }

    pub fn seat(mut self, seat_id: SeatId, row: i32, column: char, seat_type_id: SeatTypeId) -> Self {
        self.dataset.seats.push(seat(seat_id, row, column, seat_type_id));
        self
    }

    /// Unseated boarding pass; the passenger id is derived from the pass id
    pub fn pass(self, id: BoardingPassId, purchase_id: PurchaseId, age: i32, seat_type_id: SeatTypeId) -> Self {
        self.add_pass(id, purchase_id, age, seat_type_id, None)
    }

    pub fn seated_pass(
        self,
        id: BoardingPassId,
        purchase_id: PurchaseId,
        age: i32,
        seat_type_id: SeatTypeId,
        seat_id: SeatId,
    ) -> Self {
        self.add_pass(id, purchase_id, age, seat_type_id, Some(seat_id))
    }

    fn add_pass(
        mut self,
        id: BoardingPassId,
        purchase_id: PurchaseId,
        age: i32,
        seat_type_id: SeatTypeId,
        seat_id: Option<SeatId>,
    ) -> Self {
        let passenger_id = id + 1000;
        self.dataset.passengers.push(Passenger {
            passenger_id,
            dni: Masked(format!("{}", 10_000_000 + passenger_id)),
            name: format!("Passenger {}", id),
            age,
            country: "Chile".to_string(),
        });
        if !self.dataset.purchases.iter().any(|p| p.purchase_id == purchase_id) {
            self.dataset.purchases.push(Purchase {
                purchase_id,
                purchase_date: DateTime::from_timestamp(1688000000 + purchase_id, 0).unwrap(),
            });
        }
        self.dataset.boarding_passes.push(BoardingPass {
            boarding_pass_id: id,
            purchase_id,
            passenger_id,
            seat_type_id,
            seat_id,
            flight_id: 1,
        });
        self
    }

    pub fn details(&self) -> Vec<BoardingPassDetail> {
        self.dataset.boarding_pass_details(1).unwrap()
    }

    pub fn snapshot(&self) -> FlightSnapshot {
        FlightSnapshot {
            flight: self.dataset.flights[0].clone(),
            boarding_passes: self.details(),
            passengers: self.dataset.passengers.clone(),
            available_seats: self.dataset.available_seats(1, 1),
        }
    }

    pub fn dataset(&self) -> Dataset {
        self.dataset.clone()
    }
}
