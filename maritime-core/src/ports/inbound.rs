use async_trait::async_trait;

use crate::{CoreResult, NewPositionReport, VesselStatic};

#[async_trait]
pub trait AisIngestionInbound: Send + Sync + 'static {
    /// Persists all reports or none of them. Vessels that have not been seen
    /// before are created as part of the same operation.
    async fn add_position_reports(&self, reports: &[NewPositionReport]) -> CoreResult<()>;
    async fn update_vessel(&self, vessel: &VesselStatic) -> CoreResult<()>;
}
