//! The line aggregate.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    ChainError, Distance, LineSnapshot, Placement, Removal, Segment, SegmentChain, StationId,
    StationRef,
};

/// Identifier of a line.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(pub u64);

impl fmt::Debug for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineId({})", self.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptive attributes of a line. None of these affect topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInfo {
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl LineInfo {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            color: color.into(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Apply a partial update. Empty values are ignored.
    pub fn update(&mut self, name: Option<&str>, color: Option<&str>) {
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            self.name = name.to_string();
        }
        if let Some(color) = color.filter(|c| !c.is_empty()) {
            self.color = color.to_string();
        }
        self.touch();
    }

    /// Mark the line as modified now.
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

/// A line: its segment chain plus the endpoints and length derived from it.
///
/// `up_station`, `down_station` and `total_distance` only ever come from
/// `derived`, on construction and through `refresh` after every successful
/// chain change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    id: LineId,
    chain: SegmentChain,
    up_station: StationRef,
    down_station: StationRef,
    total_distance: Distance,
}

impl Line {
    /// Create a line with a single segment.
    pub fn new(
        id: LineId,
        up_station: StationRef,
        down_station: StationRef,
        distance: Distance,
    ) -> Result<Self, ChainError> {
        let chain = SegmentChain::new(up_station, down_station, distance)?;
        Ok(Self::from_chain(id, chain))
    }

    /// Wrap an existing chain.
    pub fn from_chain(id: LineId, chain: SegmentChain) -> Self {
        let (up_station, down_station, total_distance) = Self::derived(&chain);
        Self {
            id,
            chain,
            up_station,
            down_station,
            total_distance,
        }
    }

    fn derived(chain: &SegmentChain) -> (StationRef, StationRef, Distance) {
        (
            chain.head().up_station().clone(),
            chain.tail().down_station().clone(),
            chain.total_distance(),
        )
    }

    fn refresh(&mut self) {
        (self.up_station, self.down_station, self.total_distance) = Self::derived(&self.chain);
    }

    /// Add a station by inserting the segment `up_station -> down_station`.
    pub fn add_station(
        &mut self,
        up_station: StationRef,
        down_station: StationRef,
        distance: Distance,
    ) -> Result<Placement, ChainError> {
        let placement = self.chain.insert(up_station, down_station, distance)?;
        self.refresh();
        Ok(placement)
    }

    /// Remove a station, shrinking an end or merging two segments.
    pub fn remove_station(&mut self, station: StationId) -> Result<Removal, ChainError> {
        let removal = self.chain.remove(station)?;
        self.refresh();
        Ok(removal)
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn up_station(&self) -> &StationRef {
        &self.up_station
    }

    pub fn down_station(&self) -> &StationRef {
        &self.down_station
    }

    pub fn total_distance(&self) -> Distance {
        self.total_distance
    }

    /// Stations from the up end to the down end.
    pub fn stations(&self) -> Vec<&StationRef> {
        self.chain.stations()
    }

    pub fn segments(&self) -> &[Segment] {
        self.chain.segments()
    }

    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    pub fn has_station(&self, station: StationId) -> bool {
        self.chain.contains_station(station)
    }

    /// Update this line's copies of `station` after it was renamed.
    ///
    /// Returns whether the station is on the line.
    pub fn rename_station(&mut self, station: &StationRef) -> bool {
        let renamed = self.chain.rename_station(station);
        if renamed {
            self.refresh();
        }
        renamed
    }

    /// Read-only view of this line together with its metadata.
    pub fn snapshot(&self, info: &LineInfo) -> LineSnapshot {
        LineSnapshot::new(self, info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn st(id: u64, name: &str) -> StationRef {
        StationRef::new(StationId(id), name)
    }

    fn d(v: i64) -> Distance {
        Distance::new(v).unwrap()
    }

    fn sinbundang() -> Line {
        Line::new(LineId(1), st(1, "정자역"), st(2, "미금역"), d(10)).unwrap()
    }

    fn names(line: &Line) -> Vec<&str> {
        line.stations().iter().map(|s| s.name()).collect()
    }

    #[test]
    fn new_line_derives_fields() {
        let line = sinbundang();
        assert_eq!(line.up_station().name(), "정자역");
        assert_eq!(line.down_station().name(), "미금역");
        assert_eq!(line.total_distance(), d(10));
        assert_eq!(line.segments().len(), 1);
    }

    #[test]
    fn rename_updates_endpoints_and_segments() {
        let mut line = sinbundang();
        line.add_station(st(2, "미금역"), st(4, "동천역"), d(20))
            .unwrap();

        assert!(line.rename_station(&st(1, "신정자역")));
        assert!(line.rename_station(&st(2, "신미금역")));
        assert!(!line.rename_station(&st(9, "강남역")));

        assert_eq!(line.up_station().name(), "신정자역");
        assert_eq!(names(&line), vec!["신정자역", "신미금역", "동천역"]);
        assert_eq!(line.segments()[1].up_station().name(), "신미금역");
        assert_eq!(line.total_distance(), d(30));
    }

    #[test]
    fn from_chain_matches_incremental_state() {
        let mut line = sinbundang();
        line.add_station(st(3, "판교역"), st(1, "정자역"), d(5))
            .unwrap();

        let rebuilt = Line::from_chain(line.id(), line.chain().clone());
        assert_eq!(rebuilt, line);
    }

    #[test]
    fn prepend_changes_up_station() {
        let mut line = sinbundang();
        line.add_station(st(3, "판교역"), st(1, "정자역"), d(5))
            .unwrap();

        assert_eq!(line.up_station().name(), "판교역");
        assert_eq!(line.down_station().name(), "미금역");
        assert_eq!(line.total_distance(), d(15));
        assert_eq!(names(&line), vec!["판교역", "정자역", "미금역"]);
    }

    #[test]
    fn append_changes_down_station() {
        let mut line = sinbundang();
        line.add_station(st(2, "미금역"), st(4, "동천역"), d(20))
            .unwrap();

        assert_eq!(line.down_station().name(), "동천역");
        assert_eq!(line.total_distance(), d(30));
    }

    #[test]
    fn overflow_leaves_line_unchanged() {
        // 미금정자사이 -> 미금 would take 11 out of the 10-long segment
        let mut line = sinbundang();
        let before = line.clone();

        let err = line
            .add_station(st(5, "미금정자사이역"), st(2, "미금역"), d(11))
            .unwrap_err();
        assert!(matches!(err, ChainError::DistanceOverflow { .. }));
        assert_eq!(line, before);
        assert_eq!(line.total_distance(), d(10));
    }

    #[test]
    fn interior_removal_keeps_ends_and_total() {
        // 성복 - 수지구청 - 동천 - 미금
        let mut line = Line::new(LineId(1), st(1, "성복역"), st(2, "수지구청역"), d(10)).unwrap();
        line.add_station(st(2, "수지구청역"), st(4, "미금역"), d(10))
            .unwrap();
        line.add_station(st(2, "수지구청역"), st(3, "동천역"), d(5))
            .unwrap();
        assert_eq!(names(&line), vec!["성복역", "수지구청역", "동천역", "미금역"]);

        line.remove_station(StationId(3)).unwrap();
        assert_eq!(names(&line), vec!["성복역", "수지구청역", "미금역"]);
        assert_eq!(line.segments()[1].distance(), d(10));
        assert_eq!(line.total_distance(), d(20));
        assert_eq!(line.up_station().name(), "성복역");
        assert_eq!(line.down_station().name(), "미금역");
    }

    #[test]
    fn boundary_removal_moves_ends() {
        let mut line = sinbundang();
        line.add_station(st(3, "판교역"), st(1, "정자역"), d(5))
            .unwrap();

        line.remove_station(StationId(3)).unwrap();
        assert_eq!(line.segments(), sinbundang().segments());
        assert_eq!(line.up_station().name(), "정자역");
        assert_eq!(line.total_distance(), d(10));

        line.add_station(st(2, "미금역"), st(4, "동천역"), d(7))
            .unwrap();
        line.remove_station(StationId(4)).unwrap();
        assert_eq!(line.down_station().name(), "미금역");
        assert_eq!(line.total_distance(), d(10));
    }

    #[test]
    fn single_segment_removal_rejected() {
        let mut line = sinbundang();
        for station in [StationId(1), StationId(2)] {
            assert_eq!(
                line.remove_station(station).unwrap_err(),
                ChainError::MinimumChainSize
            );
        }
        assert_eq!(line, sinbundang());
    }

    #[test]
    fn info_update_ignores_empty() {
        let mut info = LineInfo::new("신분당선", "bg-red-600");
        info.update(Some(""), Some("bg-blue-600"));
        assert_eq!(info.name, "신분당선");
        assert_eq!(info.color, "bg-blue-600");

        info.update(Some("2호선"), None);
        assert_eq!(info.name, "2호선");
        assert!(info.modified_at >= info.created_at);
    }
}
