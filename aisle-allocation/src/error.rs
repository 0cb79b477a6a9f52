use aisle_core::{FlightId, LockError, RepositoryError};
use std::fmt;

/// Pipeline stage a processing fault came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Grouping,
    Segregation,
    Search,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Grouping => "grouping",
            Stage::Segregation => "segregation",
            Stage::Search => "adjacency search",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("Processing fault during {stage}: {message}")]
    Processing { stage: Stage, message: String },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Flight lock error: {0}")]
    Lock(#[from] LockError),

    #[error("Seat commit for flight {flight_id} lost a race: {source}")]
    Conflict {
        flight_id: FlightId,
        source: RepositoryError,
    },

    #[error("Allocation for flight {flight_id} did not finish within {deadline_ms}ms")]
    TimedOut { flight_id: FlightId, deadline_ms: u64 },
}

impl AllocationError {
    pub fn processing(stage: Stage, message: impl Into<String>) -> Self {
        Self::Processing { stage, message: message.into() }
    }
}
