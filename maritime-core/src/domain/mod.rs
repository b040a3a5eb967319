mod date_range;
mod mmsi;
mod position;
mod vessel;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates {
            latitude,
            longitude,
        }
    }
}

pub use date_range::*;
pub use mmsi::*;
pub use position::*;
pub use vessel::*;
