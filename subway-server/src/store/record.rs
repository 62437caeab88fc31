//! Persisted form of a line.

use serde::{Deserialize, Serialize};

use crate::domain::{Line, LineId, LineInfo, Segment, SegmentChain};

use super::error::StoreError;

/// Everything needed to rebuild a line.
///
/// Only the segments are stored; endpoints and total distance are derived
/// again on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    pub id: LineId,
    pub info: LineInfo,
    pub segments: Vec<Segment>,
}

impl LineRecord {
    pub fn new(line: &Line, info: LineInfo) -> Self {
        Self {
            id: line.id(),
            info,
            segments: line.segments().to_vec(),
        }
    }

    /// Rebuild the line, validating the stored chain.
    pub fn to_line(&self) -> Result<Line, StoreError> {
        let chain = SegmentChain::from_segments(self.segments.clone()).map_err(|source| {
            StoreError::Corrupt {
                line: self.id,
                source,
            }
        })?;
        Ok(Line::from_chain(self.id, chain))
    }
}
