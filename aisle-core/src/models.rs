use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::pii::Masked;

pub type FlightId = i64;
pub type AirplaneId = i64;
pub type SeatId = i64;
pub type SeatTypeId = i64;
pub type PassengerId = i64;
pub type PurchaseId = i64;
pub type BoardingPassId = i64;

/// A scheduled flight. Times travel as unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub flight_id: FlightId,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub takeoff_date_time: DateTime<Utc>,
    pub takeoff_airport: String,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub landing_date_time: DateTime<Utc>,
    pub landing_airport: String,
    pub airplane_id: AirplaneId,
}

/// Fare class a seat belongs to, and the entitlement a boarding pass was sold with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatType {
    pub seat_type_id: SeatTypeId,
    pub name: String,
}

/// A physical seat in an airplane cabin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub seat_id: SeatId,
    pub airplane_id: AirplaneId,
    pub seat_row: i32,
    pub seat_column: char,
    pub seat_type_id: SeatTypeId,
}

impl Seat {
    /// Cabin label such as `10C`
    pub fn label(&self) -> String {
        format!("{}{}", self.seat_row, self.seat_column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub passenger_id: PassengerId,
    pub dni: Masked<String>,
    pub name: String,
    pub age: i32,
    pub country: String,
}

/// Boarding passes bought together; the unit kept together when seating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    pub purchase_id: PurchaseId,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub purchase_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardingPass {
    pub boarding_pass_id: BoardingPassId,
    pub purchase_id: PurchaseId,
    pub passenger_id: PassengerId,
    pub seat_type_id: SeatTypeId,
    pub seat_id: Option<SeatId>,
    pub flight_id: FlightId,
}

/// A boarding pass joined with everything it references.
///
/// Read-only apart from [`BoardingPassDetail::assign`], which is the single path
/// through which a seat lands on a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardingPassDetail {
    pub boarding_pass: BoardingPass,
    pub flight: Flight,
    pub seat: Option<Seat>,
    pub passenger: Passenger,
    pub purchase: Purchase,
    pub seat_type: SeatType,
}

impl BoardingPassDetail {
    pub fn id(&self) -> BoardingPassId {
        self.boarding_pass.boarding_pass_id
    }

    pub fn purchase_id(&self) -> PurchaseId {
        self.boarding_pass.purchase_id
    }

    /// Seat type the passenger is owed
    pub fn entitlement(&self) -> SeatTypeId {
        self.boarding_pass.seat_type_id
    }

    pub fn is_seated(&self) -> bool {
        self.boarding_pass.seat_id.is_some()
    }

    /// Attach `seat` to this pass. Returns false, leaving the pass untouched,
    /// when it already holds a seat.
    pub fn assign(&mut self, seat: Seat) -> bool {
        if self.is_seated() {
            return false;
        }
        self.boarding_pass.seat_id = Some(seat.seat_id);
        self.seat = Some(seat);
        true
    }
}

/// A seat committed to a boarding pass during an allocation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub boarding_pass_id: BoardingPassId,
    pub seat_id: SeatId,
}
