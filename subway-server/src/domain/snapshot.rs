//! Read-only views of a line.

use super::{Distance, Line, LineId, LineInfo, SegmentId, StationId, StationRef};

/// A segment as it appears in a snapshot, with its neighbours resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentView {
    pub id: SegmentId,
    pub up_station: StationRef,
    pub down_station: StationRef,
    pub distance: Distance,
    pub predecessor: Option<SegmentId>,
    pub successor: Option<SegmentId>,
}

/// The full state of a line at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSnapshot {
    pub id: LineId,
    pub info: LineInfo,
    pub up_station: StationRef,
    pub down_station: StationRef,
    pub total_distance: Distance,
    pub stations: Vec<StationRef>,
    pub segments: Vec<SegmentView>,
}

impl LineSnapshot {
    pub fn new(line: &Line, info: &LineInfo) -> Self {
        let chain = line.chain();
        let segments = chain
            .iter()
            .map(|s| SegmentView {
                id: s.id(),
                up_station: s.up_station().clone(),
                down_station: s.down_station().clone(),
                distance: s.distance(),
                predecessor: chain.predecessor(s.id()).map(|p| p.id()),
                successor: chain.successor(s.id()).map(|n| n.id()),
            })
            .collect();

        Self {
            id: line.id(),
            info: info.clone(),
            up_station: line.up_station().clone(),
            down_station: line.down_station().clone(),
            total_distance: line.total_distance(),
            stations: line.stations().into_iter().cloned().collect(),
            segments,
        }
    }

    /// Whether `station` is on the line.
    pub fn has_station(&self, station: StationId) -> bool {
        self.stations.iter().any(|s| s.id() == station)
    }
}
