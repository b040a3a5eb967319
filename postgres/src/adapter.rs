use async_trait::async_trait;
use chrono::{DateTime, Utc};
use maritime_core::{
    ActiveVessel, AisIngestionInbound, AisIngestionOutbound, AnalyticsOutbound, CoreResult, Mmsi,
    NewPositionReport, PositionReport, QueryRange, Vessel, VesselStatic,
};
use serde::Deserialize;
use snafu::ResultExt;
use sqlx::{
    ConnectOptions, PgPool,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use tracing::instrument;

use crate::error::{
    Result,
    error::{ConnectionSnafu, MigrateSnafu},
};

#[derive(Debug, Clone, Deserialize)]
pub struct PsqlSettings {
    pub ip: String,
    pub port: u16,
    pub db_name: Option<String>,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
    pub root_cert: Option<String>,
    #[serde(default)]
    pub log_statements: PsqlLogStatements,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PsqlLogStatements {
    Enable,
    #[default]
    Disable,
}

#[derive(Debug, Clone)]
pub struct PostgresAdapter {
    pub(crate) pool: PgPool,
}

impl PostgresAdapter {
    pub async fn new(settings: &PsqlSettings) -> Result<PostgresAdapter> {
        let mut opts = PgConnectOptions::new()
            .username(&settings.username)
            .password(&settings.password)
            .host(&settings.ip)
            .port(settings.port)
            .options([("plan_cache_mode", "force_custom_plan")]);

        if let Some(db_name) = &settings.db_name {
            opts = opts.database(db_name);
        }

        if let Some(root_cert_path) = &settings.root_cert {
            opts = opts
                .ssl_root_cert(root_cert_path)
                .ssl_mode(PgSslMode::VerifyFull);
        }

        if settings.log_statements == PsqlLogStatements::Disable {
            opts = opts.disable_statement_logging();
        }

        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections.max(1))
            .connect_with(opts)
            .await
            .context(ConnectionSnafu)?;

        Ok(PostgresAdapter { pool })
    }

    pub async fn do_migrations(&self) -> Result<()> {
        sqlx::migrate!()
            .set_ignore_missing(true)
            .run(&self.pool)
            .await
            .context(MigrateSnafu)
    }
}

#[async_trait]
impl AisIngestionInbound for PostgresAdapter {
    #[instrument(skip_all, fields(app.num_reports = reports.len()))]
    async fn add_position_reports(&self, reports: &[NewPositionReport]) -> CoreResult<()> {
        Ok(self.add_position_reports_impl(reports).await?)
    }

    async fn update_vessel(&self, vessel: &VesselStatic) -> CoreResult<()> {
        Ok(self.update_vessel_impl(vessel).await?)
    }
}

#[async_trait]
impl AisIngestionOutbound for PostgresAdapter {
    async fn latest_position_reports(&self) -> CoreResult<Vec<PositionReport>> {
        Ok(self
            .latest_position_reports_impl(None)
            .await?
            .into_iter()
            .map(|v| v.latest)
            .collect())
    }
}

#[async_trait]
impl AnalyticsOutbound for PostgresAdapter {
    async fn active_vessels(&self, since: DateTime<Utc>) -> CoreResult<Vec<ActiveVessel>> {
        Ok(self.latest_position_reports_impl(Some(since)).await?)
    }

    async fn position_reports(
        &self,
        mmsi: Mmsi,
        range: &QueryRange,
    ) -> CoreResult<Vec<PositionReport>> {
        Ok(self.position_reports_impl(Some(mmsi), range).await?)
    }

    async fn all_position_reports(&self, range: &QueryRange) -> CoreResult<Vec<PositionReport>> {
        Ok(self.position_reports_impl(None, range).await?)
    }

    async fn vessel(&self, mmsi: Mmsi) -> CoreResult<Option<Vessel>> {
        Ok(self.vessel_impl(mmsi).await?)
    }
}
