//! Domain types for line topology.
//!
//! This module contains the segment-chain engine: validated distances,
//! segments, the ordered chain that keeps them consistent, and the line
//! aggregate built on top. All of it is synchronous and in-memory; storage
//! and locking live in the layers above.

mod chain;
mod distance;
mod error;
mod line;
mod segment;
mod snapshot;
mod station;

pub use chain::{Placement, Removal, SegmentChain};
pub use distance::{Distance, InvalidDistance};
pub use error::ChainError;
pub use line::{Line, LineId, LineInfo};
pub use segment::{Segment, SegmentId};
pub use snapshot::{LineSnapshot, SegmentView};
pub use station::{StationId, StationRef};
