use aisle_allocation::AllocationError;
use aisle_core::{FlightId, RepositoryError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Body text clients of the previous service match on, typo included
pub const STORAGE_UNAVAILABLE: &str = "could not be connect to db";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Flight {0} not found")]
    NotFound(FlightId),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, json!({ "code": 404, "data": {} })),
            AppError::Allocation(AllocationError::Repository(e @ RepositoryError::Unavailable(_))) => {
                tracing::error!("Storage failure: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "code": 400, "errors": STORAGE_UNAVAILABLE }),
                )
            }
            AppError::Allocation(e @ AllocationError::TimedOut { .. }) => {
                tracing::warn!("{}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "code": 503, "errors": e.to_string() }),
                )
            }
            AppError::Allocation(e) => {
                tracing::error!("Internal Server Error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "code": 500, "errors": "Internal Server Error" }),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "code": 500, "errors": "Internal Server Error" }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aisle_allocation::Stage;
    use aisle_core::LockError;

    #[test]
    fn test_status_mapping() {
        let status = |e: AppError| e.into_response().status();

        assert_eq!(status(AppError::NotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(
            status(AllocationError::Repository(RepositoryError::Unavailable("down".into())).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(AllocationError::Repository(RepositoryError::Malformed("dangling seat".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(AllocationError::TimedOut { flight_id: 1, deadline_ms: 10 }.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(AllocationError::processing(Stage::Search, "overflow").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(AllocationError::Lock(LockError::Backend("gone".into())).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(anyhow::anyhow!("boom").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
