use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Mmsi, NewPositionReport, ValidationError, validation_error::UnknownMessageSnafu};

/// Speed used by `add_vessel` commands that do not specify one.
pub const DEFAULT_VESSEL_SPEED_KNOTS: f64 = 15.0;

/// Commands sent by consumers of the live stream to steer the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlCommand {
    SetSpeed {
        #[serde(alias = "speed_factor")]
        speed: f64,
    },
    AddVessel {
        mmsi: Mmsi,
        #[serde(default = "default_vessel_speed")]
        speed: f64,
    },
}

/// Everything the publisher sends to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutboundEvent {
    Position(PositionEvent),
    Notice(Notice),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEvent {
    pub message: SentenceKind,
    pub mmsi: Mmsi,
    pub timestamp: DateTime<Utc>,
    pub decoded: DecodedPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentenceKind {
    #[serde(rename = "AIVDM")]
    Aivdm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub course: f64,
    pub heading: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notice {
    VesselAdded {
        mmsi: Mmsi,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_port: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_port: Option<String>,
    },
    SpeedUpdated {
        speed: f64,
    },
}

fn default_vessel_speed() -> f64 {
    DEFAULT_VESSEL_SPEED_KNOTS
}

impl FromStr for ControlCommand {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|e| {
            UnknownMessageSnafu {
                reason: e.to_string(),
            }
            .build()
        })
    }
}

impl FromStr for OutboundEvent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|e| {
            UnknownMessageSnafu {
                reason: e.to_string(),
            }
            .build()
        })
    }
}

impl OutboundEvent {
    pub fn to_json(&self) -> String {
        // Serialization of these types cannot fail: no maps with non-string
        // keys and no fallible Serialize impls.
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&NewPositionReport> for PositionEvent {
    fn from(value: &NewPositionReport) -> Self {
        PositionEvent {
            message: SentenceKind::Aivdm,
            mmsi: value.mmsi,
            timestamp: value.timestamp,
            decoded: DecodedPosition {
                latitude: value.latitude,
                longitude: value.longitude,
                speed: value.speed,
                course: value.course,
                heading: value.heading,
            },
        }
    }
}

impl From<PositionEvent> for NewPositionReport {
    fn from(value: PositionEvent) -> Self {
        let PositionEvent {
            message: _,
            mmsi,
            timestamp,
            decoded,
        } = value;

        NewPositionReport {
            mmsi,
            timestamp,
            latitude: decoded.latitude,
            longitude: decoded.longitude,
            speed: decoded.speed,
            course: decoded.course,
            heading: decoded.heading,
        }
    }
}
