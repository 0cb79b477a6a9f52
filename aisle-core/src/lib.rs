pub mod models;
pub mod pii;
pub mod repository;
pub mod lock;
pub mod dataset;

pub use models::{
    AirplaneId, BoardingPass, BoardingPassDetail, BoardingPassId, Flight, FlightId, Passenger,
    PassengerId, Purchase, PurchaseId, Seat, SeatAssignment, SeatId, SeatType, SeatTypeId,
};
pub use pii::Masked;
pub use repository::{FlightRepository, RepositoryError, RepositoryResult};
pub use lock::{FlightLease, FlightLock, LockError};
pub use dataset::Dataset;
