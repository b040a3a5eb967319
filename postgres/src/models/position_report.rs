use chrono::{DateTime, Utc};
use maritime_core::{ActiveVessel, Mmsi, PositionReport, Vessel};
use snafu::ResultExt;

use crate::error::{Error, error::DataConversionSnafu};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PositionReportRow {
    pub position_report_id: i64,
    pub mmsi: i32,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub course: f64,
    pub heading: Option<f64>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActiveVesselRow {
    #[sqlx(flatten)]
    pub report: PositionReportRow,
    pub name: Option<String>,
    pub ship_type: Option<i32>,
}

impl TryFrom<PositionReportRow> for PositionReport {
    type Error = Error;

    fn try_from(value: PositionReportRow) -> Result<Self, Self::Error> {
        let PositionReportRow {
            position_report_id,
            mmsi,
            timestamp,
            latitude,
            longitude,
            speed,
            course,
            heading,
        } = value;

        Ok(PositionReport {
            sequence: position_report_id,
            mmsi: Mmsi::try_from(mmsi).context(DataConversionSnafu)?,
            timestamp,
            latitude,
            longitude,
            speed,
            course,
            heading,
        })
    }
}

impl TryFrom<ActiveVesselRow> for ActiveVessel {
    type Error = Error;

    fn try_from(value: ActiveVesselRow) -> Result<Self, Self::Error> {
        let latest = PositionReport::try_from(value.report)?;
        Ok(ActiveVessel {
            vessel: Vessel {
                mmsi: latest.mmsi,
                name: value.name,
                ship_type: value.ship_type,
            },
            latest,
        })
    }
}
