//! Station directory error types.

use crate::domain::StationId;
use crate::store::StoreError;

/// Errors from registering or looking up stations.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// No station with this id
    #[error("station {0} not found")]
    NotFound(StationId),

    /// Station names must be non-empty
    #[error("station name cannot be empty")]
    EmptyName,

    /// Station names are unique
    #[error("station {0:?} already exists")]
    DuplicateName(String),

    /// The registry file could not be read or written
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            StationError::NotFound(StationId(3)).to_string(),
            "station 3 not found"
        );
        assert_eq!(
            StationError::EmptyName.to_string(),
            "station name cannot be empty"
        );
        assert_eq!(
            StationError::DuplicateName("정자역".into()).to_string(),
            "station \"정자역\" already exists"
        );
    }
}
