//! Wire types exchanged with the tracking backend.

use chrono::{DateTime, Utc};
use satdash_globe::{GeoPoint, MarkerSample};
use serde::{Deserialize, Deserializer, Serialize};

/// Refresh status that triggers a dependent list reload.
pub const REFRESH_COMPLETED: &str = "completed";

/// A tracked satellite as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Satellite {
    /// NORAD catalog number.
    pub norad_id: u32,

    /// Object name; the backend may send `null`, which reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    /// When the backend last refreshed this record.
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,

    /// International designator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,

    /// Epoch of the element set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launch_epoch: Option<DateTime<Utc>>,

    /// Inclination in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclination: Option<f64>,

    /// Orbital eccentricity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eccentricity: Option<f64>,

    /// Mean motion in revolutions per day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_motion: Option<f64>,

    /// Drag term.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bstar: Option<f64>,
}

impl Satellite {
    /// Create a bare record with only the list fields set.
    #[must_use]
    pub fn new(
        norad_id: u32,
        name: impl Into<String>,
        last_updated: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            norad_id,
            name: name.into(),
            last_updated,
            object_id: None,
            launch_epoch: None,
            inclination: None,
            eccentricity: None,
            mean_motion: None,
            bstar: None,
        }
    }

    /// Path of the per-satellite detail page.
    #[must_use]
    pub fn detail_path(&self) -> String {
        format!("/satellite/{}", self.norad_id)
    }
}

/// Response of `GET /api/satellites`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteList {
    /// The satellites.
    pub satellites: Vec<Satellite>,
    /// When the backend produced this list.
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    /// Number of satellites reported by the backend.
    #[serde(default)]
    pub count: usize,
}

/// A sub-satellite point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// NORAD catalog number.
    pub norad_id: u32,
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
    /// Altitude in kilometres.
    pub alt_km: f64,
}

impl From<&Position> for MarkerSample {
    fn from(position: &Position) -> Self {
        Self {
            id: position.norad_id,
            point: GeoPoint::new(position.lon, position.lat),
            alt_km: position.alt_km,
        }
    }
}

/// Response of `GET /api/satellites/positions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionBatch {
    /// When the positions were computed.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// The positions; satellites the backend could not propagate are absent.
    #[serde(default)]
    pub positions: Vec<Position>,
}

/// Response of `POST /api/refresh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshStatus {
    /// `"completed"` on success, `"error"` when the upstream fetch failed.
    pub status: String,
    /// Number of satellites processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// When the refresh settled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,
    /// Error detail when the refresh failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RefreshStatus {
    /// Check whether the refresh completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == REFRESH_COMPLETED
    }
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"ok"` when the backend is healthy.
    pub status: String,
    /// Backend clock at the time of the check.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Optional filters for `GET /api/satellites`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SatelliteQuery {
    /// Maximum number of records.
    pub limit: Option<usize>,
    /// Number of records to skip.
    pub offset: Option<usize>,
    /// Only records updated at or after this instant.
    pub updated_since: Option<DateTime<Utc>>,
}

impl SatelliteQuery {
    /// Query string pairs for the request, omitting unset fields.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(since) = self.updated_since {
            // The backend parses naive ISO timestamps in UTC.
            pairs.push(("updated_since", since.format("%Y-%m-%dT%H:%M:%S").to_string()));
        }
        pairs
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_satellite_list_deserialize() {
        let json = r#"{
            "count": 2,
            "updated": "2024-03-01T12:00:00.123456Z",
            "satellites": [
                {"norad_id": 25544, "name": "ISS (ZARYA)", "object_id": "1998-067A",
                 "launch_epoch": "2024-02-29T10:00:00.000000Z", "inclination": 51.64,
                 "eccentricity": 0.0005, "mean_motion": 15.5, "bstar": 0.0001,
                 "last_updated": "2024-03-01T11:59:00.000000Z"},
                {"norad_id": 20580, "name": null, "last_updated": null}
            ]
        }"#;
        let list: SatelliteList = serde_json::from_str(json).unwrap();
        assert_eq!(list.count, 2);
        assert!(list.updated.is_some());
        assert_eq!(list.satellites[0].norad_id, 25544);
        assert_eq!(list.satellites[0].object_id.as_deref(), Some("1998-067A"));
        assert_eq!(list.satellites[1].name, "");
        assert!(list.satellites[1].last_updated.is_none());
    }

    #[test]
    fn test_position_batch_deserialize() {
        let json = r#"{"timestamp": "2024-03-01T12:00:00Z",
            "positions": [{"norad_id": 25544, "lat": 51.2, "lon": -12.5, "alt_km": 418.7}]}"#;
        let batch: PositionBatch = serde_json::from_str(json).unwrap();
        assert_eq!(batch.positions.len(), 1);
        assert!((batch.positions[0].alt_km - 418.7).abs() < 1e-9);
    }

    #[test]
    fn test_position_to_marker_sample() {
        let position = Position {
            norad_id: 7,
            lon: 10.0,
            lat: -20.0,
            alt_km: 550.0,
        };
        let sample = MarkerSample::from(&position);
        assert_eq!(sample.id, 7);
        assert_eq!(sample.point, GeoPoint::new(10.0, -20.0));
    }

    #[test]
    fn test_refresh_status() {
        let done: RefreshStatus =
            serde_json::from_str(r#"{"status": "completed", "count": 10}"#).unwrap();
        assert!(done.is_completed());
        assert_eq!(done.count, Some(10));

        let failed: RefreshStatus =
            serde_json::from_str(r#"{"status": "error", "message": "upstream down"}"#).unwrap();
        assert!(!failed.is_completed());
        assert_eq!(failed.message.as_deref(), Some("upstream down"));
    }

    #[test]
    fn test_detail_path() {
        let sat = Satellite::new(25544, "ISS", None);
        assert_eq!(sat.detail_path(), "/satellite/25544");
    }

    #[test]
    fn test_query_pairs() {
        assert!(SatelliteQuery::default().to_pairs().is_empty());

        let query = SatelliteQuery {
            limit: Some(50),
            offset: Some(100),
            updated_since: Some(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()),
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("limit", "50".to_string()),
                ("offset", "100".to_string()),
                ("updated_since", "2024-01-02T03:04:05".to_string()),
            ]
        );
    }
}
