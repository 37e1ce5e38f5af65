use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::readings::models::RoomReading;

/// Upper bound (inclusive) of the comfortable band, degrees Celsius.
pub const COMFORTABLE_MAX_C: f64 = 25.0;
/// Upper bound (inclusive) of the warm band, degrees Celsius.
pub const WARM_MAX_C: f64 = 29.0;

/// Comfort band derived solely from a temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Comfort {
    Comfortable,
    Warm,
    Hot,
}

impl Comfort {
    pub const ALL: [Comfort; 3] = [Comfort::Comfortable, Comfort::Warm, Comfort::Hot];

    pub fn as_str(self) -> &'static str {
        match self {
            Comfort::Comfortable => "comfortable",
            Comfort::Warm => "warm",
            Comfort::Hot => "hot",
        }
    }
}

impl fmt::Display for Comfort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a Celsius temperature.
///
/// Both band boundaries belong to the lower band: 25.0 is comfortable and
/// 29.0 is warm. NaN compares false against both bounds and lands in `Hot`.
pub fn classify(temperature_c: f64) -> Comfort {
    if temperature_c <= COMFORTABLE_MAX_C {
        Comfort::Comfortable
    } else if temperature_c <= WARM_MAX_C {
        Comfort::Warm
    } else {
        Comfort::Hot
    }
}

/// Number of rooms per comfort band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ComfortCounts {
    pub comfortable: usize,
    pub warm: usize,
    pub hot: usize,
}

impl ComfortCounts {
    pub fn from_rooms(rooms: &[RoomReading]) -> Self {
        rooms.iter().fold(Self::default(), |mut acc, room| {
            match room.comfort {
                Comfort::Comfortable => acc.comfortable += 1,
                Comfort::Warm => acc.warm += 1,
                Comfort::Hot => acc.hot += 1,
            }
            acc
        })
    }

    pub fn get(&self, comfort: Comfort) -> usize {
        match comfort {
            Comfort::Comfortable => self.comfortable,
            Comfort::Warm => self.warm,
            Comfort::Hot => self.hot,
        }
    }

    pub fn total(&self) -> usize {
        self.comfortable + self.warm + self.hot
    }
}
