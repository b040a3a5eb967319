use std::{fmt, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{ValidationError, validation_error::InvalidMmsiSnafu};

const MMSI_DIGITS: usize = 9;

/// Maritime Mobile Service Identity, always exactly nine digits.
/// Travels on the wire as a string to preserve leading zeros.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr,
)]
pub struct Mmsi(u32);

impl Mmsi {
    pub fn into_inner(self) -> u32 {
        self.0
    }

    /// Storage representation, every valid mmsi fits in an `i32`.
    pub fn as_i32(self) -> i32 {
        self.0 as i32
    }

    #[cfg(feature = "test")]
    pub fn test_new(value: u32) -> Mmsi {
        Mmsi(value % 1_000_000_000)
    }
}

impl FromStr for Mmsi {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != MMSI_DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
            return InvalidMmsiSnafu { value: s }.fail();
        }

        s.parse::<u32>()
            .map(Mmsi)
            .map_err(|_| InvalidMmsiSnafu { value: s }.build())
    }
}

impl TryFrom<i32> for Mmsi {
    type Error = ValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if (0..1_000_000_000).contains(&value) {
            Ok(Mmsi(value as u32))
        } else {
            InvalidMmsiSnafu {
                value: value.to_string(),
            }
            .fail()
        }
    }
}

impl fmt::Display for Mmsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:09}", self.0)
    }
}
