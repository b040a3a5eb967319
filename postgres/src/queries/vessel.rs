use maritime_core::{Mmsi, Vessel, VesselStatic};
use snafu::ResultExt;

use crate::{
    PostgresAdapter,
    error::{Result, error::QuerySnafu},
    models::VesselRow,
};

impl PostgresAdapter {
    pub(crate) async fn update_vessel_impl(&self, vessel: &VesselStatic) -> Result<()> {
        sqlx::query(
            r#"
INSERT INTO
    vessels (mmsi, "name", ship_type)
VALUES
    ($1, $2, $3)
ON CONFLICT (mmsi) DO UPDATE
SET
    "name" = COALESCE(EXCLUDED."name", vessels."name"),
    ship_type = COALESCE(EXCLUDED.ship_type, vessels.ship_type),
    updated_at = NOW()
            "#,
        )
        .bind(vessel.mmsi.as_i32())
        .bind(vessel.name.as_deref())
        .bind(vessel.ship_type)
        .execute(&self.pool)
        .await
        .context(QuerySnafu)?;

        Ok(())
    }

    pub(crate) async fn vessel_impl(&self, mmsi: Mmsi) -> Result<Option<Vessel>> {
        sqlx::query_as::<_, VesselRow>(
            r#"
SELECT
    mmsi,
    "name",
    ship_type
FROM
    vessels
WHERE
    mmsi = $1
            "#,
        )
        .bind(mmsi.as_i32())
        .fetch_optional(&self.pool)
        .await
        .context(QuerySnafu)?
        .map(Vessel::try_from)
        .transpose()
    }
}
