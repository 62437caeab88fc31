//! Data transfer objects for web requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{LineSnapshot, SegmentView, StationRef};

/// Request to register a station.
#[derive(Debug, Deserialize)]
pub struct StationRequest {
    pub name: String,
}

/// A station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationResponse {
    pub id: u64,
    pub name: String,
}

impl From<&StationRef> for StationResponse {
    fn from(station: &StationRef) -> Self {
        Self {
            id: station.id().0,
            name: station.name().to_string(),
        }
    }
}

/// Request to create a line with its first section.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRequest {
    pub name: String,
    pub color: String,
    pub up_station_id: u64,
    pub down_station_id: u64,
    pub distance: i64,
}

/// Request to rename or recolor a line.
#[derive(Debug, Default, Deserialize)]
pub struct LineUpdateRequest {
    pub name: Option<String>,
    pub color: Option<String>,
}

/// Request to add a section (and so a station) to a line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRequest {
    pub up_station_id: u64,
    pub down_station_id: u64,
    pub distance: i64,
}

/// Query selecting the station to remove from a line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveSectionQuery {
    pub station_id: u64,
}

/// A line with its stations in order.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineResponse {
    pub id: u64,
    pub name: String,
    pub color: String,
    pub up_station: StationResponse,
    pub down_station: StationResponse,

    /// Total length of the line
    pub distance: u64,

    /// Stations from the up end to the down end
    pub stations: Vec<StationResponse>,

    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

impl LineResponse {
    pub fn from_snapshot(snapshot: &LineSnapshot) -> Self {
        Self {
            id: snapshot.id.0,
            name: snapshot.info.name.clone(),
            color: snapshot.info.color.clone(),
            up_station: (&snapshot.up_station).into(),
            down_station: (&snapshot.down_station).into(),
            distance: snapshot.total_distance.get(),
            stations: snapshot.stations.iter().map(StationResponse::from).collect(),
            created_date: snapshot.info.created_at,
            modified_date: snapshot.info.modified_at,
        }
    }
}

/// A section of a line.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResponse {
    pub id: u64,
    pub up_station: StationResponse,
    pub down_station: StationResponse,
    pub line_name: String,
    pub distance: u64,

    /// The adjacent section towards the up end, if any
    pub previous_section_id: Option<u64>,

    /// The adjacent section towards the down end, if any
    pub next_section_id: Option<u64>,
}

impl SectionResponse {
    pub fn from_segment(segment: &SegmentView, line_name: &str) -> Self {
        Self {
            id: segment.id.0,
            up_station: (&segment.up_station).into(),
            down_station: (&segment.down_station).into(),
            line_name: line_name.to_string(),
            distance: segment.distance.get(),
            previous_section_id: segment.predecessor.map(|s| s.0),
            next_section_id: segment.successor.map(|s| s.0),
        }
    }

    /// All sections of a line, head to tail.
    pub fn list(snapshot: &LineSnapshot) -> Vec<Self> {
        snapshot
            .segments
            .iter()
            .map(|s| Self::from_segment(s, &snapshot.info.name))
            .collect()
    }
}

/// Error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Distance, Line, LineId, LineInfo, StationId};

    fn snapshot() -> LineSnapshot {
        let st = |id, name| StationRef::new(StationId(id), name);
        let mut line = Line::new(
            LineId(1),
            st(1, "정자역"),
            st(2, "미금역"),
            Distance::new(10).unwrap(),
        )
        .unwrap();
        line.add_station(st(3, "판교역"), st(1, "정자역"), Distance::new(5).unwrap())
            .unwrap();
        LineSnapshot::new(&line, &LineInfo::new("신분당선", "bg-red-600"))
    }

    #[test]
    fn line_response_fields() {
        let response = LineResponse::from_snapshot(&snapshot());
        assert_eq!(response.name, "신분당선");
        assert_eq!(response.up_station.name, "판교역");
        assert_eq!(response.down_station.name, "미금역");
        assert_eq!(response.distance, 15);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["upStation"]["name"], "판교역");
        assert_eq!(json["stations"][1]["name"], "정자역");
        assert!(json.get("createdDate").is_some());
    }

    #[test]
    fn section_responses_link_neighbours() {
        let sections = SectionResponse::list(&snapshot());
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].previous_section_id, None);
        assert_eq!(sections[0].next_section_id, Some(sections[1].id));
        assert_eq!(sections[1].previous_section_id, Some(sections[0].id));
        assert_eq!(sections[1].next_section_id, None);
        assert_eq!(sections[1].line_name, "신분당선");
    }

    #[test]
    fn section_request_is_camel_case() {
        let req: SectionRequest =
            serde_json::from_str(r#"{"upStationId": 3, "downStationId": 1, "distance": 5}"#)
                .unwrap();
        assert_eq!(req.up_station_id, 3);
        assert_eq!(req.down_station_id, 1);
        assert_eq!(req.distance, 5);
    }
}
