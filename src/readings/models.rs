use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::comfort::{classify, Comfort};

pub const HUMIDITY_MIN: u8 = 30;
pub const HUMIDITY_MAX: u8 = 90;

/// Fixed reference reading a live snapshot is perturbed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseRoom {
    pub id: u32,
    pub name: String,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: u8,
}

impl BaseRoom {
    pub fn new(id: u32, name: impl Into<String>, temperature: f64, humidity: u8) -> Self {
        Self { id, name: name.into(), temperature, humidity }
    }
}

/// One room's reading within a snapshot.
///
/// `comfort` is always derived from `temperature`; construct through
/// [`RoomReading::new`] so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RoomReading {
    pub id: u32,
    pub name: String,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage, within [30, 90]
    pub humidity: u8,
    pub comfort: Comfort,
}

impl RoomReading {
    pub fn new(id: u32, name: impl Into<String>, temperature: f64, humidity: u8) -> Self {
        Self {
            id,
            name: name.into(),
            temperature,
            humidity,
            comfort: classify(temperature),
        }
    }
}

impl From<&BaseRoom> for RoomReading {
    fn from(base: &BaseRoom) -> Self {
        Self::new(base.id, base.name.clone(), base.temperature, base.humidity)
    }
}

/// Clamp a signed humidity value into the displayable range.
pub fn clamp_humidity(value: i32) -> u8 {
    // Clamped into [30, 90], always fits a u8.
    value.clamp(HUMIDITY_MIN as i32, HUMIDITY_MAX as i32) as u8
}

/// Round to one decimal place.
pub fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
