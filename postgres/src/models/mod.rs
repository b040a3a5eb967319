mod position_report;
mod vessel;

pub use position_report::*;
pub use vessel::*;
