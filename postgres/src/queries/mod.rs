mod position_report;
mod vessel;
