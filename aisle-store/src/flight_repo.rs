use aisle_core::{
    AirplaneId, BoardingPass, BoardingPassDetail, Flight, FlightId, FlightRepository, Masked,
    Passenger, PassengerId, Purchase, RepositoryError, RepositoryResult, Seat, SeatAssignment,
    SeatType,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, warn};

pub struct PostgresFlightRepository {
    pub pool: sqlx::PgPool,
}

impl PostgresFlightRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FlightRow {
    flight_id: i64,
    takeoff_date_time: i64,
    takeoff_airport: String,
    landing_date_time: i64,
    landing_airport: String,
    airplane_id: i64,
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    seat_id: i64,
    airplane_id: i64,
    seat_row: i32,
    seat_column: String,
    seat_type_id: i64,
}

#[derive(sqlx::FromRow)]
struct PassengerRow {
    passenger_id: i64,
    dni: String,
    name: String,
    age: i32,
    country: String,
}

/// One boarding pass joined with its references, flattened
#[derive(sqlx::FromRow)]
struct BoardingPassRow {
    boarding_pass_id: i64,
    purchase_id: i64,
    passenger_id: i64,
    seat_type_id: i64,
    seat_id: Option<i64>,
    flight_id: i64,
    takeoff_date_time: i64,
    takeoff_airport: String,
    landing_date_time: i64,
    landing_airport: String,
    airplane_id: i64,
    seat_airplane_id: Option<i64>,
    seat_row: Option<i32>,
    seat_column: Option<String>,
    seat_seat_type_id: Option<i64>,
    dni: String,
    name: String,
    age: i32,
    country: String,
    purchase_date: i64,
    seat_type_name: String,
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    error!("Database query failed: {}", e);
    RepositoryError::Unavailable(e.to_string())
}

fn timestamp(secs: i64, field: &str) -> RepositoryResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| RepositoryError::Malformed(format!("{} {} is out of range", field, secs)))
}

fn column(value: &str, seat_id: i64) -> RepositoryResult<char> {
    value
        .trim()
        .chars()
        .next()
        .ok_or_else(|| RepositoryError::Malformed(format!("seat {} has no column", seat_id)))
}

impl TryFrom<FlightRow> for Flight {
    type Error = RepositoryError;

    fn try_from(row: FlightRow) -> RepositoryResult<Self> {
        Ok(Flight {
            flight_id: row.flight_id,
            takeoff_date_time: timestamp(row.takeoff_date_time, "takeoff_date_time")?,
            takeoff_airport: row.takeoff_airport,
            landing_date_time: timestamp(row.landing_date_time, "landing_date_time")?,
            landing_airport: row.landing_airport,
            airplane_id: row.airplane_id,
        })
    }
}

impl TryFrom<SeatRow> for Seat {
    type Error = RepositoryError;

    fn try_from(row: SeatRow) -> RepositoryResult<Self> {
        Ok(Seat {
            seat_id: row.seat_id,
            airplane_id: row.airplane_id,
            seat_row: row.seat_row,
            seat_column: column(&row.seat_column, row.seat_id)?,
            seat_type_id: row.seat_type_id,
        })
    }
}

impl From<PassengerRow> for Passenger {
    fn from(row: PassengerRow) -> Self {
        Passenger {
            passenger_id: row.passenger_id,
            dni: Masked(row.dni),
            name: row.name,
            age: row.age,
            country: row.country,
        }
    }
}

impl TryFrom<BoardingPassRow> for BoardingPassDetail {
    type Error = RepositoryError;

    fn try_from(row: BoardingPassRow) -> RepositoryResult<Self> {
        let seat = match (row.seat_id, row.seat_airplane_id, row.seat_row, row.seat_column, row.seat_seat_type_id) {
            (Some(seat_id), Some(airplane_id), Some(seat_row), Some(seat_column), Some(seat_type_id)) => Some(Seat {
                seat_id,
                airplane_id,
                seat_row,
                seat_column: column(&seat_column, seat_id)?,
                seat_type_id,
            }),
            (None, ..) => None,
            (Some(seat_id), ..) => {
                return Err(RepositoryError::Malformed(format!(
                    "boarding pass {} references missing seat {}",
                    row.boarding_pass_id, seat_id
                )))
            }
        };

        Ok(BoardingPassDetail {
            boarding_pass: BoardingPass {
                boarding_pass_id: row.boarding_pass_id,
                purchase_id: row.purchase_id,
                passenger_id: row.passenger_id,
                seat_type_id: row.seat_type_id,
                seat_id: row.seat_id,
                flight_id: row.flight_id,
            },
            flight: Flight {
                flight_id: row.flight_id,
                takeoff_date_time: timestamp(row.takeoff_date_time, "takeoff_date_time")?,
                takeoff_airport: row.takeoff_airport,
                landing_date_time: timestamp(row.landing_date_time, "landing_date_time")?,
                landing_airport: row.landing_airport,
                airplane_id: row.airplane_id,
            },
            seat,
            passenger: Passenger {
                passenger_id: row.passenger_id,
                dni: Masked(row.dni),
                name: row.name,
                age: row.age,
                country: row.country,
            },
            purchase: Purchase {
                purchase_id: row.purchase_id,
                purchase_date: timestamp(row.purchase_date, "purchase_date")?,
            },
            seat_type: SeatType {
                seat_type_id: row.seat_type_id,
                name: row.seat_type_name,
            },
        })
    }
}

#[async_trait]
impl FlightRepository for PostgresFlightRepository {
    async fn get_flight_by_id(&self, flight_id: FlightId) -> RepositoryResult<Option<Flight>> {
        let row = sqlx::query_as::<_, FlightRow>(
            r#"
            SELECT flight_id, takeoff_date_time, takeoff_airport,
                   landing_date_time, landing_airport, airplane_id
            FROM flight
            WHERE flight_id = $1
            "#,
        )
        .bind(flight_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Flight::try_from).transpose()
    }

    async fn get_boarding_passes_by_flight_id(
        &self,
        flight_id: FlightId,
    ) -> RepositoryResult<Vec<BoardingPassDetail>> {
        let rows = sqlx::query_as::<_, BoardingPassRow>(
            r#"
            SELECT
                bp.boarding_pass_id, bp.purchase_id, bp.passenger_id, bp.seat_type_id,
                bp.seat_id, bp.flight_id,
                f.takeoff_date_time, f.takeoff_airport, f.landing_date_time,
                f.landing_airport, f.airplane_id,
                s.airplane_id AS seat_airplane_id, s.seat_row, s.seat_column,
                s.seat_type_id AS seat_seat_type_id,
                p.dni, p.name, p.age, p.country,
                pu.purchase_date,
                st.name AS seat_type_name
            FROM boarding_pass bp
            JOIN flight f ON f.flight_id = bp.flight_id
            JOIN passenger p ON p.passenger_id = bp.passenger_id
            JOIN purchase pu ON pu.purchase_id = bp.purchase_id
            JOIN seat_type st ON st.seat_type_id = bp.seat_type_id
            LEFT JOIN seat s ON s.seat_id = bp.seat_id
            WHERE bp.flight_id = $1
            ORDER BY bp.boarding_pass_id
            "#,
        )
        .bind(flight_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(BoardingPassDetail::try_from).collect()
    }

    async fn get_passengers_by_ids(
        &self,
        passenger_ids: &[PassengerId],
    ) -> RepositoryResult<Vec<Passenger>> {
        if passenger_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PassengerRow>(
            r#"
            SELECT passenger_id, dni, name, age, country
            FROM passenger
            WHERE passenger_id = ANY($1)
            "#,
        )
        .bind(passenger_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(rows.into_iter().map(Passenger::from).collect())
    }

    async fn get_available_seats(
        &self,
        airplane_id: AirplaneId,
        flight_id: FlightId,
    ) -> RepositoryResult<Vec<Seat>> {
        let rows = sqlx::query_as::<_, SeatRow>(
            r#"
            SELECT s.seat_id, s.airplane_id, s.seat_row, s.seat_column, s.seat_type_id
            FROM seat s
            WHERE s.airplane_id = $1
              AND NOT EXISTS (
                  SELECT 1 FROM boarding_pass bp
                  WHERE bp.flight_id = $2 AND bp.seat_id = s.seat_id
              )
            ORDER BY s.seat_id
            "#,
        )
        .bind(airplane_id)
        .bind(flight_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(Seat::try_from).collect()
    }

    async fn commit_assignments(
        &self,
        flight_id: FlightId,
        assignments: &[SeatAssignment],
    ) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for assignment in assignments {
            let result = sqlx::query(
                r#"
                UPDATE boarding_pass
                SET seat_id = $1
                WHERE boarding_pass_id = $2
                  AND flight_id = $3
                  AND seat_id IS NULL
                  AND NOT EXISTS (
                      SELECT 1 FROM boarding_pass taken
                      WHERE taken.flight_id = $3 AND taken.seat_id = $1
                  )
                "#,
            )
            .bind(assignment.seat_id)
            .bind(assignment.boarding_pass_id)
            .bind(flight_id)
            .execute(&mut *tx)
            .await;

            let conflict = RepositoryError::Conflict {
                boarding_pass_id: assignment.boarding_pass_id,
                seat_id: assignment.seat_id,
            };

            match result {
                Ok(done) if done.rows_affected() == 1 => {}
                Ok(_) => {
                    warn!("Seat {} already taken on flight {}", assignment.seat_id, flight_id);
                    return Err(conflict);
                }
                // Unique index on (flight_id, seat_id) caught a concurrent writer
                Err(sqlx::Error::Database(e)) if e.is_unique_violation() => return Err(conflict),
                Err(e) => return Err(db_error(e)),
            }
        }

        tx.commit().await.map_err(db_error)
    }
}
