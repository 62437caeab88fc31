//! Store error types.

use std::path::PathBuf;

use crate::domain::{ChainError, LineId};

/// Errors from loading or saving lines.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Stored segments do not form a valid line
    #[error("stored line {line} is corrupt: {source}")]
    Corrupt {
        line: LineId,
        #[source]
        source: ChainError,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
