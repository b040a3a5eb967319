use crate::{Mmsi, PositionReport};

#[derive(Debug, Clone, PartialEq)]
pub struct Vessel {
    pub mmsi: Mmsi,
    pub name: Option<String>,
    pub ship_type: Option<i32>,
}

/// Identity enrichment for a vessel, fields that are `None` never replace
/// stored values.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselStatic {
    pub mmsi: Mmsi,
    pub name: Option<String>,
    pub ship_type: Option<i32>,
}

/// A vessel together with its most recent stored report.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveVessel {
    pub vessel: Vessel,
    pub latest: PositionReport,
}

impl Vessel {
    pub fn new(mmsi: Mmsi) -> Vessel {
        Vessel {
            mmsi,
            name: None,
            ship_type: None,
        }
    }

    pub fn enrich(&mut self, update: &VesselStatic) {
        if let Some(name) = &update.name {
            self.name = Some(name.clone());
        }
        if let Some(ship_type) = update.ship_type {
            self.ship_type = Some(ship_type);
        }
    }
}
