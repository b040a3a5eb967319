use chrono::{DateTime, Utc};
use maritime_core::{Mmsi, PositionReport};
use serde::Serialize;

/// Lifetime overview of a vessel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselSummary {
    pub mmsi: Mmsi,
    pub name: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub total_distance_nm: f64,
    pub message_count: usize,
    #[serde(skip)]
    pub latest: PositionReport,
}

/// Motion statistics of a vessel over a half-open time range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselStatistics {
    pub mmsi: Mmsi,
    pub message_count: usize,
    pub duration_hours: f64,
    pub total_distance_nm: f64,
    pub average_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub min_speed: Option<f64>,
    /// Circular mean of the reported courses.
    pub average_course: Option<f64>,
    /// Distance over duration, absent when the duration is zero.
    pub average_speed_over_ground: Option<f64>,
}

/// Number of reports whose position rounds to this grid cell centre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityCell {
    pub latitude: f64,
    pub longitude: f64,
    pub count: usize,
}

/// Two reports from different vessels close in both space and time.
/// `first` is always the vessel with the smaller mmsi.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Encounter {
    pub first: Mmsi,
    pub second: Mmsi,
    pub distance_nm: f64,
    pub first_timestamp: DateTime<Utc>,
    pub second_timestamp: DateTime<Utc>,
    /// Position of the `first` vessel.
    pub latitude: f64,
    pub longitude: f64,
}
