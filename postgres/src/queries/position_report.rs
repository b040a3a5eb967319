use chrono::{DateTime, Utc};
use maritime_core::{ActiveVessel, Mmsi, NewPositionReport, PositionReport, QueryRange};
use snafu::ResultExt;
use sqlx::postgres::types::PgRange;

use crate::{
    PostgresAdapter,
    error::{Result, error::QuerySnafu},
    models::{ActiveVesselRow, PositionReportRow},
};

impl PostgresAdapter {
    /// Inserts the whole batch in one transaction. Reports identical to an
    /// already stored one are skipped by the unique constraint.
    pub(crate) async fn add_position_reports_impl(
        &self,
        reports: &[NewPositionReport],
    ) -> Result<()> {
        if reports.is_empty() {
            return Ok(());
        }

        let len = reports.len();
        let mut mmsi = Vec::with_capacity(len);
        let mut timestamp = Vec::with_capacity(len);
        let mut latitude = Vec::with_capacity(len);
        let mut longitude = Vec::with_capacity(len);
        let mut speed = Vec::with_capacity(len);
        let mut course = Vec::with_capacity(len);
        let mut heading = Vec::with_capacity(len);

        for r in reports {
            mmsi.push(r.mmsi.as_i32());
            timestamp.push(r.timestamp);
            latitude.push(r.latitude);
            longitude.push(r.longitude);
            speed.push(r.speed);
            course.push(r.course);
            heading.push(r.heading);
        }

        let mut tx = self.pool.begin().await.context(QuerySnafu)?;

        sqlx::query(
            r#"
INSERT INTO
    vessels (mmsi)
SELECT
    *
FROM
    UNNEST($1::INT[])
ON CONFLICT (mmsi) DO NOTHING
            "#,
        )
        .bind(&mmsi)
        .execute(&mut *tx)
        .await
        .context(QuerySnafu)?;

        sqlx::query(
            r#"
INSERT INTO
    position_reports (
        mmsi,
        "timestamp",
        latitude,
        longitude,
        speed,
        course,
        heading
    )
SELECT
    *
FROM
    UNNEST(
        $1::INT[],
        $2::TIMESTAMPTZ[],
        $3::DOUBLE PRECISION[],
        $4::DOUBLE PRECISION[],
        $5::DOUBLE PRECISION[],
        $6::DOUBLE PRECISION[],
        $7::DOUBLE PRECISION[]
    )
ON CONFLICT (mmsi, "timestamp", latitude, longitude) DO NOTHING
            "#,
        )
        .bind(&mmsi)
        .bind(&timestamp)
        .bind(&latitude)
        .bind(&longitude)
        .bind(&speed)
        .bind(&course)
        .bind(&heading)
        .execute(&mut *tx)
        .await
        .context(QuerySnafu)?;

        tx.commit().await.context(QuerySnafu)?;

        Ok(())
    }

    /// Most recent report per vessel, ties on timestamp go to the highest
    /// ingestion sequence.
    pub(crate) async fn latest_position_reports_impl(
        &self,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<ActiveVessel>> {
        sqlx::query_as::<_, ActiveVesselRow>(
            r#"
SELECT
    l.position_report_id,
    l.mmsi,
    l."timestamp",
    l.latitude,
    l.longitude,
    l.speed,
    l.course,
    l.heading,
    v."name",
    v.ship_type
FROM
    (
        SELECT DISTINCT
            ON (mmsi) *
        FROM
            position_reports
        ORDER BY
            mmsi,
            "timestamp" DESC,
            position_report_id DESC
    ) l
    INNER JOIN vessels v ON v.mmsi = l.mmsi
WHERE
    $1::TIMESTAMPTZ IS NULL
    OR l."timestamp" >= $1
ORDER BY
    l.mmsi
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .context(QuerySnafu)?
        .into_iter()
        .map(ActiveVessel::try_from)
        .collect()
    }

    pub(crate) async fn position_reports_impl(
        &self,
        mmsi: Option<Mmsi>,
        range: &QueryRange,
    ) -> Result<Vec<PositionReport>> {
        let range = PgRange::from((range.start(), range.end()));

        sqlx::query_as::<_, PositionReportRow>(
            r#"
SELECT
    position_report_id,
    mmsi,
    "timestamp",
    latitude,
    longitude,
    speed,
    course,
    heading
FROM
    position_reports
WHERE
    (
        $1::INT IS NULL
        OR mmsi = $1
    )
    AND "timestamp" <@ $2::TSTZRANGE
ORDER BY
    "timestamp",
    position_report_id
            "#,
        )
        .bind(mmsi.map(Mmsi::as_i32))
        .bind(range)
        .fetch_all(&self.pool)
        .await
        .context(QuerySnafu)?
        .into_iter()
        .map(PositionReport::try_from)
        .collect()
    }
}
