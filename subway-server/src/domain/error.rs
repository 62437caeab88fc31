//! Segment chain error types.
//!
//! Every variant is an expected outcome the caller can act on. None of
//! them indicate an internal fault, and a failed operation never leaves
//! the chain partially updated.

use super::{Distance, InvalidDistance, StationId};

/// Errors from line topology operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// A supplied distance is not strictly positive
    #[error(transparent)]
    InvalidDistance(#[from] InvalidDistance),

    /// An identical (up, down) segment is already on the line
    #[error("segment {up} -> {down} already exists on this line")]
    DuplicateSegment { up: StationId, down: StationId },

    /// The inserted segment is not shorter than the segment it would split
    #[error("segment distance {requested} must be less than the existing {available}")]
    DistanceOverflow {
        requested: Distance,
        available: Distance,
    },

    /// Neither endpoint of the new segment is on the line
    #[error("segment {up} -> {down} does not connect to this line")]
    DisconnectedSegment { up: StationId, down: StationId },

    /// A line must keep at least one segment
    #[error("cannot remove a station from a line with a single segment")]
    MinimumChainSize,

    /// The station to remove is not on the line
    #[error("station {0} is not on this line")]
    StationNotOnLine(StationId),

    /// A segment cannot start and end at the same station
    #[error("segment cannot start and end at station {0}")]
    SameStation(StationId),

    /// Both endpoints already on the line; inserting would form a cycle
    #[error("stations {up} and {down} are both already on this line")]
    BothStationsOnLine { up: StationId, down: StationId },

    /// Stored segments do not form a valid chain
    #[error("inconsistent segment chain: {0}")]
    Inconsistent(&'static str),
}
