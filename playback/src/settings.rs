use std::time::Duration;

use config::ConfigError;
use maritime_core::{Environment, LogFormat, Mmsi, load_settings};
use serde::Deserialize;

use crate::{route::FinalWaypoint, vessel::Navigation};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub environment: Environment,
    #[serde(default)]
    pub log_format: LogFormat,
    pub host: String,
    pub port: u16,
    #[serde(with = "humantime_serde")]
    pub message_interval: Duration,
    pub speed_factor: f64,
    pub consumer_queue_size: usize,
    pub arrival_tolerance_nm: f64,
    #[serde(default)]
    pub final_waypoint: FinalWaypoint,
    /// Vessels added when the simulation starts.
    #[serde(default)]
    pub vessels: Vec<InitialVessel>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct InitialVessel {
    pub mmsi: Mmsi,
    pub speed: f64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        load_settings("MARITIME_PLAYBACK")
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn navigation(&self) -> Navigation {
        Navigation {
            arrival_tolerance_nm: self.arrival_tolerance_nm,
            final_waypoint: self.final_waypoint,
        }
    }
}
