//! Line service error types.

use crate::domain::{ChainError, LineId, StationId};
use crate::stations::StationError;
use crate::store::StoreError;

/// Errors from line operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The requested topology change was rejected
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// No line with this id
    #[error("line {0} not found")]
    LineNotFound(LineId),

    /// A referenced station is not registered
    #[error("station {0} not found")]
    StationNotFound(StationId),

    /// A line needs a name
    #[error("line name cannot be empty")]
    EmptyLineName,

    /// Line names are unique
    #[error("line {0:?} already exists")]
    DuplicateLineName(String),

    /// The station cannot be deleted while a line uses it
    #[error("station {station} is still on line {line}")]
    StationInUse { station: StationId, line: LineId },

    /// The station registry rejected the change
    #[error(transparent)]
    Station(#[from] StationError),

    /// Loading or saving failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ServiceError::LineNotFound(LineId(3));
        assert_eq!(err.to_string(), "line 3 not found");

        let err = ServiceError::StationNotFound(StationId(8));
        assert_eq!(err.to_string(), "station 8 not found");

        let err = ServiceError::StationInUse {
            station: StationId(1),
            line: LineId(2),
        };
        assert_eq!(err.to_string(), "station 1 is still on line 2");

        let err = ServiceError::DuplicateLineName("신분당선".into());
        assert_eq!(err.to_string(), "line \"신분당선\" already exists");

        let err: ServiceError = ChainError::MinimumChainSize.into();
        assert_eq!(
            err.to_string(),
            "cannot remove a station from a line with a single segment"
        );
    }
}
