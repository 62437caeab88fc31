//! A single track segment between two adjacent stations.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ChainError, Distance, StationId, StationRef};

/// Stable identifier of a segment within its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(pub u64);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A directed edge from `up_station` to `down_station`.
///
/// A segment only knows its own endpoints. Its predecessor and successor
/// are given by its position in the owning [`SegmentChain`](super::SegmentChain).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    id: SegmentId,
    up_station: StationRef,
    down_station: StationRef,
    distance: Distance,
}

impl Segment {
    /// Create a segment.
    ///
    /// Returns [`ChainError::SameStation`] if both ends are the same station.
    pub fn new(
        id: SegmentId,
        up_station: StationRef,
        down_station: StationRef,
        distance: Distance,
    ) -> Result<Self, ChainError> {
        if up_station == down_station {
            return Err(ChainError::SameStation(up_station.id()));
        }
        Ok(Self {
            id,
            up_station,
            down_station,
            distance,
        })
    }

    pub fn id(&self) -> SegmentId {
        self.id
    }

    pub fn up_station(&self) -> &StationRef {
        &self.up_station
    }

    pub fn down_station(&self) -> &StationRef {
        &self.down_station
    }

    pub fn distance(&self) -> Distance {
        self.distance
    }

    /// Whether either end of this segment is `station`.
    pub fn has_station(&self, station: StationId) -> bool {
        self.up_station.id() == station || self.down_station.id() == station
    }

    /// Whether this segment runs exactly from `up` to `down`.
    pub fn connects(&self, up: StationId, down: StationId) -> bool {
        self.up_station.id() == up && self.down_station.id() == down
    }

    /// Take `station`'s new name at whichever end has its id.
    pub fn rename_station(&mut self, station: &StationRef) -> bool {
        let mut renamed = false;
        for end in [&mut self.up_station, &mut self.down_station] {
            if end.id() == station.id() {
                *end = station.clone();
                renamed = true;
            }
        }
        renamed
    }

    /// Split this segment around `inserted`, which must share either its up
    /// station or its down station with `self`.
    ///
    /// Returns the two replacement segments in head-to-tail order. The
    /// remainder keeps this segment's id, and the two distances sum to
    /// this segment's distance.
    pub fn split_at(&self, inserted: &Segment) -> Result<[Segment; 2], ChainError> {
        let remainder = self
            .distance
            .subtract(inserted.distance)
            .map_err(|_| ChainError::DistanceOverflow {
                requested: inserted.distance,
                available: self.distance,
            })?;

        if inserted.up_station == self.up_station {
            let rest = Segment::new(
                self.id,
                inserted.down_station.clone(),
                self.down_station.clone(),
                remainder,
            )?;
            Ok([inserted.clone(), rest])
        } else if inserted.down_station == self.down_station {
            let rest = Segment::new(
                self.id,
                self.up_station.clone(),
                inserted.up_station.clone(),
                remainder,
            )?;
            Ok([rest, inserted.clone()])
        } else {
            Err(ChainError::DisconnectedSegment {
                up: inserted.up_station.id(),
                down: inserted.down_station.id(),
            })
        }
    }

    /// Join this segment with an adjacent one into a single segment `id`.
    ///
    /// The pair may be given in either order; whichever segment ends where
    /// the other starts is taken to be nearer the head.
    pub fn merge_with(&self, neighbor: &Segment, id: SegmentId) -> Segment {
        let (upper, lower) = if neighbor.down_station == self.up_station {
            (neighbor, self)
        } else {
            (self, neighbor)
        };
        Segment {
            id,
            up_station: upper.up_station.clone(),
            down_station: lower.down_station.clone(),
            distance: self.distance.add(neighbor.distance),
        }
    }
}
