//! Ordered segment chain for a single line.
//!
//! Segments are stored head-to-tail in a `Vec`. A segment's predecessor
//! and successor are simply its neighbours in that sequence, so splits and
//! merges are plain splices and links can never drift out of sync.

use std::collections::HashSet;

use super::{ChainError, Distance, Segment, SegmentId, StationId, StationRef};

/// Where an inserted segment ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Became the new head; the line's up station changed.
    Prepended,
    /// Became the new tail; the line's down station changed.
    Appended,
    /// Took the front of an existing segment that starts at the same station.
    SplitFront,
    /// Took the back of an existing segment that ends at the same station.
    SplitBack,
}

/// What a station removal did to the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The head segment was dropped.
    DroppedHead,
    /// The tail segment was dropped.
    DroppedTail,
    /// Two interior segments were merged into one.
    Merged,
}

/// The ordered, non-empty sequence of segments that makes up a line.
///
/// Invariants held between operations:
/// - at least one segment;
/// - each segment's down station is the next segment's up station;
/// - every station appears at most once (so no cycles, branches, or
///   duplicate `(up, down)` pairs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentChain {
    segments: Vec<Segment>,
    next_id: u64,
}

impl SegmentChain {
    /// Create a chain holding a single segment.
    pub fn new(
        up_station: StationRef,
        down_station: StationRef,
        distance: Distance,
    ) -> Result<Self, ChainError> {
        let first = Segment::new(SegmentId(1), up_station, down_station, distance)?;
        Ok(Self {
            segments: vec![first],
            next_id: 2,
        })
    }

    /// Rebuild a chain from segments in head-to-tail order.
    ///
    /// Used when loading persisted state; every chain invariant is checked.
    pub fn from_segments(segments: Vec<Segment>) -> Result<Self, ChainError> {
        let next_id = segments.iter().map(|s| s.id().0).max().unwrap_or(0) + 1;
        let chain = Self { segments, next_id };
        chain.validate()?;
        Ok(chain)
    }

    /// Check every chain invariant.
    pub fn validate(&self) -> Result<(), ChainError> {
        if self.segments.is_empty() {
            return Err(ChainError::Inconsistent("chain is empty"));
        }

        if self
            .segments
            .windows(2)
            .any(|w| w[0].down_station() != w[1].up_station())
        {
            return Err(ChainError::Inconsistent(
                "adjacent segments do not share a station",
            ));
        }

        let stations: HashSet<StationId> = self.stations().iter().map(|s| s.id()).collect();
        if stations.len() != self.segments.len() + 1 {
            return Err(ChainError::Inconsistent("a station appears more than once"));
        }

        let ids: HashSet<SegmentId> = self.segments.iter().map(Segment::id).collect();
        if ids.len() != self.segments.len() {
            return Err(ChainError::Inconsistent("segment ids are not unique"));
        }

        Ok(())
    }

    /// The segment nearest the line's up end.
    pub fn head(&self) -> &Segment {
        // Non-empty by invariant
        &self.segments[0]
    }

    /// The segment nearest the line's down end.
    pub fn tail(&self) -> &Segment {
        &self.segments[self.segments.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments in head-to-tail order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    fn position(&self, id: SegmentId) -> Option<usize> {
        self.segments.iter().position(|s| s.id() == id)
    }

    /// The segment immediately before `id`, or `None` at the head.
    pub fn predecessor(&self, id: SegmentId) -> Option<&Segment> {
        let pos = self.position(id)?;
        pos.checked_sub(1).map(|p| &self.segments[p])
    }

    /// The segment immediately after `id`, or `None` at the tail.
    pub fn successor(&self, id: SegmentId) -> Option<&Segment> {
        let pos = self.position(id)?;
        self.segments.get(pos + 1)
    }

    pub fn is_head(&self, id: SegmentId) -> bool {
        self.head().id() == id
    }

    pub fn is_tail(&self, id: SegmentId) -> bool {
        self.tail().id() == id
    }

    /// Sum of all segment distances.
    pub fn total_distance(&self) -> Distance {
        self.segments
            .iter()
            .skip(1)
            .fold(self.head().distance(), |acc, s| acc.add(s.distance()))
    }

    /// Stations from the up end to the down end.
    pub fn stations(&self) -> Vec<&StationRef> {
        let mut stations: Vec<&StationRef> =
            self.segments.iter().map(Segment::up_station).collect();
        if let Some(last) = self.segments.last() {
            stations.push(last.down_station());
        }
        stations
    }

    /// Whether `station` is an endpoint of any segment.
    pub fn contains_station(&self, station: StationId) -> bool {
        self.segments.iter().any(|s| s.has_station(station))
    }

    /// Replace every copy of `station` (matched by id) with the given one.
    pub fn rename_station(&mut self, station: &StationRef) -> bool {
        let mut renamed = false;
        for segment in &mut self.segments {
            renamed |= segment.rename_station(station);
        }
        renamed
    }

    /// Insert a segment from `up_station` to `down_station`.
    ///
    /// Extends the head if `down_station` is the current up end, otherwise
    /// extends the tail if `up_station` is the current down end, otherwise
    /// splits the segment sharing an anchor station with the new one.
    pub fn insert(
        &mut self,
        up_station: StationRef,
        down_station: StationRef,
        distance: Distance,
    ) -> Result<Placement, ChainError> {
        let (up, down) = (up_station.id(), down_station.id());

        if self.segments.iter().any(|s| s.connects(up, down)) {
            return Err(ChainError::DuplicateSegment { up, down });
        }

        let inserted = Segment::new(SegmentId(self.next_id), up_station, down_station, distance)?;

        if self.contains_station(up) && self.contains_station(down) {
            return Err(ChainError::BothStationsOnLine { up, down });
        }

        let placement = if down == self.head().up_station().id() {
            self.segments.insert(0, inserted);
            Placement::Prepended
        } else if up == self.tail().down_station().id() {
            self.segments.push(inserted);
            Placement::Appended
        } else {
            let Some(pos) = self
                .segments
                .iter()
                .position(|s| s.up_station().id() == up || s.down_station().id() == down)
            else {
                return Err(ChainError::DisconnectedSegment { up, down });
            };

            let target = &self.segments[pos];
            let placement = if target.up_station().id() == up {
                Placement::SplitFront
            } else {
                Placement::SplitBack
            };
            let fragments = target.split_at(&inserted)?;
            self.segments.splice(pos..=pos, fragments);
            placement
        };

        self.next_id += 1;
        Ok(placement)
    }

    /// Remove `station` from the chain.
    ///
    /// An end station takes its boundary segment with it; an interior
    /// station causes its two adjacent segments to be merged.
    pub fn remove(&mut self, station: StationId) -> Result<Removal, ChainError> {
        if self.segments.len() == 1 {
            return Err(ChainError::MinimumChainSize);
        }

        if self.head().up_station().id() == station {
            self.segments.remove(0);
            return Ok(Removal::DroppedHead);
        }

        if self.tail().down_station().id() == station {
            self.segments.pop();
            return Ok(Removal::DroppedTail);
        }

        let pos = self
            .segments
            .windows(2)
            .position(|w| {
                w[0].down_station().id() == station && w[1].up_station().id() == station
            })
            .ok_or(ChainError::StationNotOnLine(station))?;

        let merged =
            self.segments[pos].merge_with(&self.segments[pos + 1], SegmentId(self.next_id));
        self.next_id += 1;
        self.segments.splice(pos..pos + 2, [merged]);
        Ok(Removal::Merged)
    }
}

impl<'a> IntoIterator for &'a SegmentChain {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Insert(u64, u64, i64),
        Remove(u64),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u64..10, 0u64..10, 1i64..30).prop_map(|(u, d, l)| Op::Insert(u, d, l)),
            (0u64..10).prop_map(Op::Remove),
        ]
    }

    fn st(id: u64) -> StationRef {
        StationRef::new(StationId(id), format!("s{id}"))
    }

    proptest! {
        /// Every reachable chain is a simple path whose total is tracked
        /// exactly, and failed operations change nothing.
        #[test]
        fn invariants_hold_under_random_edits(ops in proptest::collection::vec(op(), 1..60)) {
            let mut chain = SegmentChain::new(st(0), st(1), Distance::new(50).unwrap()).unwrap();
            let mut expected_total = 50u64;

            for op in ops {
                let before = chain.clone();
                match op {
                    Op::Insert(up, down, len) => {
                        let distance = Distance::new(len).unwrap();
                        match chain.insert(st(up), st(down), distance) {
                            Ok(_) => expected_total += distance.get(),
                            Err(_) => prop_assert_eq!(&chain, &before),
                        }
                    }
                    Op::Remove(station) => {
                        let head = before.head().clone();
                        let tail = before.tail().clone();
                        match chain.remove(StationId(station)) {
                            Ok(Removal::DroppedHead) => expected_total -= head.distance().get(),
                            Ok(Removal::DroppedTail) => expected_total -= tail.distance().get(),
                            Ok(Removal::Merged) => {}
                            Err(_) => prop_assert_eq!(&chain, &before),
                        }
                    }
                }

                prop_assert!(chain.validate().is_ok());
                prop_assert_eq!(chain.total_distance().get(), expected_total);
                prop_assert_eq!(chain.stations().len(), chain.len() + 1);
            }
        }

        /// Inserting the same segment twice fails the second time
        #[test]
        fn second_identical_insert_is_duplicate(len in 1i64..9) {
            let mut chain = SegmentChain::new(st(0), st(1), Distance::new(10).unwrap()).unwrap();
            let distance = Distance::new(len).unwrap();
            prop_assert!(chain.insert(st(0), st(2), distance).is_ok());
            let before = chain.clone();
            prop_assert_eq!(
                chain.insert(st(0), st(2), distance),
                Err(ChainError::DuplicateSegment { up: StationId(0), down: StationId(2) })
            );
            prop_assert_eq!(chain, before);
        }
    }
}
