use maritime_core::{Mmsi, Vessel};
use snafu::ResultExt;

use crate::error::{Error, error::DataConversionSnafu};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VesselRow {
    pub mmsi: i32,
    pub name: Option<String>,
    pub ship_type: Option<i32>,
}

impl TryFrom<VesselRow> for Vessel {
    type Error = Error;

    fn try_from(value: VesselRow) -> Result<Self, Self::Error> {
        Ok(Vessel {
            mmsi: Mmsi::try_from(value.mmsi).context(DataConversionSnafu)?,
            name: value.name,
            ship_type: value.ship_type,
        })
    }
}
