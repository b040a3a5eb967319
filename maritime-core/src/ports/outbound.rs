use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{ActiveVessel, CoreResult, Mmsi, PositionReport, QueryRange, Vessel};

#[async_trait]
pub trait AisIngestionOutbound: Send + Sync + 'static {
    /// The most recent stored report of every vessel.
    async fn latest_position_reports(&self) -> CoreResult<Vec<PositionReport>>;
}

/// Read-only queries used by the analytics. All report lists are ordered by
/// timestamp and then by ingestion sequence.
#[async_trait]
pub trait AnalyticsOutbound: Send + Sync + 'static {
    /// Vessels whose most recent report is at or after `since`.
    async fn active_vessels(&self, since: DateTime<Utc>) -> CoreResult<Vec<ActiveVessel>>;
    async fn position_reports(
        &self,
        mmsi: Mmsi,
        range: &QueryRange,
    ) -> CoreResult<Vec<PositionReport>>;
    async fn all_position_reports(&self, range: &QueryRange) -> CoreResult<Vec<PositionReport>>;
    async fn vessel(&self, mmsi: Mmsi) -> CoreResult<Option<Vessel>>;
}
