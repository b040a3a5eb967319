use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;
use maritime_core::{
    ActiveVessel, AnalyticsOutbound, Mean, Mmsi, PositionReport, QueryRange,
    geo::{circular_mean_degrees, distance_nm, path_length_nm},
};
use snafu::ResultExt;
use tracing::{debug, instrument};

use crate::{
    DensityCell, Encounter, VesselStatistics, VesselSummary,
    error::{
        Result,
        analytics_error::{InvalidArgumentSnafu, InvalidRangeSnafu, StorageSnafu},
    },
};

/// Read-only queries over stored position reports.
#[derive(Clone)]
pub struct Analytics {
    adapter: Arc<dyn AnalyticsOutbound>,
}

impl Analytics {
    pub fn new(adapter: Arc<dyn AnalyticsOutbound>) -> Analytics {
        Analytics { adapter }
    }

    /// Every vessel with a report within the last `window`, with its most
    /// recent report.
    pub async fn list_active_vessels(&self, window: Duration) -> Result<Vec<ActiveVessel>> {
        self.list_active_vessels_at(Utc::now(), window).await
    }

    #[instrument(skip(self), fields(app.num_vessels))]
    pub async fn list_active_vessels_at(
        &self,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Result<Vec<ActiveVessel>> {
        if window < Duration::zero() {
            return InvalidArgumentSnafu {
                name: "window",
                value: window.num_seconds() as f64,
            }
            .fail();
        }

        let since = now
            .checked_sub_signed(window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let vessels = self
            .adapter
            .active_vessels(since)
            .await
            .context(StorageSnafu)?;

        tracing::Span::current().record("app.num_vessels", vessels.len());

        Ok(vessels)
    }

    /// Lifetime overview of a vessel, `None` if nothing is stored for it.
    #[instrument(skip(self))]
    pub async fn vessel_summary(&self, mmsi: Mmsi) -> Result<Option<VesselSummary>> {
        let reports = self.reports(mmsi, &QueryRange::unbounded()).await?;

        let (Some(first), Some(latest)) = (reports.first(), reports.last()) else {
            debug!("no reports stored for vessel");
            return Ok(None);
        };

        let name = self
            .adapter
            .vessel(mmsi)
            .await
            .context(StorageSnafu)?
            .and_then(|v| v.name);

        Ok(Some(VesselSummary {
            mmsi,
            name,
            first_seen: first.timestamp,
            last_seen: latest.timestamp,
            total_distance_nm: track_distance(&reports),
            message_count: reports.len(),
            latest: latest.clone(),
        }))
    }

    /// Statistics over `[start, end)`. The duration spans the given bounds,
    /// falling back to the first or last observed report for an omitted
    /// bound, and is zero when there are no reports.
    #[instrument(skip(self))]
    pub async fn vessel_statistics(
        &self,
        mmsi: Mmsi,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<VesselStatistics> {
        let range = QueryRange::half_open(start, end).context(InvalidRangeSnafu)?;
        let reports = self.reports(mmsi, &range).await?;

        let (Some(first), Some(last)) = (reports.first(), reports.last()) else {
            return Ok(VesselStatistics {
                mmsi,
                message_count: 0,
                duration_hours: 0.0,
                total_distance_nm: 0.0,
                average_speed: None,
                max_speed: None,
                min_speed: None,
                average_course: None,
                average_speed_over_ground: None,
            });
        };

        let start = start.unwrap_or(first.timestamp);
        let end = end.unwrap_or(last.timestamp);
        let duration_hours = (end - start).num_milliseconds() as f64 / 3_600_000.0;

        let total_distance_nm = track_distance(&reports);
        let average_speed: Option<f64> = reports.iter().map(|r| r.speed).mean();

        Ok(VesselStatistics {
            mmsi,
            message_count: reports.len(),
            duration_hours,
            total_distance_nm,
            average_speed,
            max_speed: reports.iter().map(|r| r.speed).max_by(f64::total_cmp),
            min_speed: reports.iter().map(|r| r.speed).min_by(f64::total_cmp),
            average_course: circular_mean_degrees(reports.iter().map(|r| r.course)),
            average_speed_over_ground: (duration_hours > 0.0)
                .then(|| total_distance_nm / duration_hours),
        })
    }

    /// Ordered reports of a vessel within `[start, end]`.
    pub async fn vessel_track(
        &self,
        mmsi: Mmsi,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<PositionReport>> {
        let range = QueryRange::inclusive(start, end).context(InvalidRangeSnafu)?;
        self.reports(mmsi, &range).await
    }

    /// Report counts per grid cell within `[start, end]`, ordered by cell
    /// latitude and then longitude.
    #[instrument(skip(self), fields(app.num_cells))]
    pub async fn density_map(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        grid_size: f64,
    ) -> Result<Vec<DensityCell>> {
        if !(grid_size.is_finite() && grid_size > 0.0) {
            return InvalidArgumentSnafu {
                name: "grid_size",
                value: grid_size,
            }
            .fail();
        }

        let range = QueryRange::inclusive(start, end).context(InvalidRangeSnafu)?;
        let reports = self
            .adapter
            .all_position_reports(&range)
            .await
            .context(StorageSnafu)?;

        let cells = reports
            .iter()
            .map(|r| {
                (
                    (r.latitude / grid_size).round() as i64,
                    (r.longitude / grid_size).round() as i64,
                )
            })
            .counts()
            .into_iter()
            .sorted_unstable_by_key(|(cell, _)| *cell)
            .map(|((lat, lon), count)| DensityCell {
                latitude: lat as f64 * grid_size,
                longitude: lon as f64 * grid_size,
                count,
            })
            .collect::<Vec<_>>();

        tracing::Span::current().record("app.num_cells", cells.len());

        Ok(cells)
    }

    /// Every pair of reports from two different vessels that lie within
    /// `threshold_nm` of each other and at most `window` apart in time.
    #[instrument(skip(self), fields(app.num_encounters))]
    pub async fn vessel_encounters(
        &self,
        threshold_nm: f64,
        window: Duration,
    ) -> Result<Vec<Encounter>> {
        if !(threshold_nm.is_finite() && threshold_nm >= 0.0) {
            return InvalidArgumentSnafu {
                name: "threshold_nm",
                value: threshold_nm,
            }
            .fail();
        }
        if window < Duration::zero() {
            return InvalidArgumentSnafu {
                name: "window",
                value: window.num_seconds() as f64,
            }
            .fail();
        }

        let reports = self
            .adapter
            .all_position_reports(&QueryRange::unbounded())
            .await
            .context(StorageSnafu)?;

        let encounters = find_encounters(&reports, threshold_nm, window);
        tracing::Span::current().record("app.num_encounters", encounters.len());

        Ok(encounters)
    }

    async fn reports(&self, mmsi: Mmsi, range: &QueryRange) -> Result<Vec<PositionReport>> {
        self.adapter
            .position_reports(mmsi, range)
            .await
            .context(StorageSnafu)
    }
}

/// Distance travelled along reports already ordered by timestamp, shared by
/// summaries and statistics so that both always agree.
fn track_distance(reports: &[PositionReport]) -> f64 {
    let positions = reports.iter().map(|r| r.coordinates()).collect::<Vec<_>>();
    path_length_nm(&positions)
}

/// `reports` must be ordered by timestamp. Pairs are reported with the
/// smaller mmsi first.
fn find_encounters(
    reports: &[PositionReport],
    threshold_nm: f64,
    window: Duration,
) -> Vec<Encounter> {
    let mut encounters = Vec::new();

    for (i, a) in reports.iter().enumerate() {
        let position = a.coordinates();
        for b in reports[i + 1..]
            .iter()
            .take_while(|b| b.timestamp - a.timestamp <= window)
        {
            if a.mmsi == b.mmsi {
                continue;
            }

            let distance = distance_nm(&position, &b.coordinates());
            if distance > threshold_nm {
                continue;
            }

            let (first, second) = if a.mmsi < b.mmsi { (a, b) } else { (b, a) };
            encounters.push(Encounter {
                first: first.mmsi,
                second: second.mmsi,
                distance_nm: distance,
                first_timestamp: first.timestamp,
                second_timestamp: second.timestamp,
                latitude: first.latitude,
                longitude: first.longitude,
            });
        }
    }

    encounters
}
