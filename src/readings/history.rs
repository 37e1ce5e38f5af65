//! Synthetic hourly history for a room.
//!
//! Nothing is recorded: every call invents a fresh series around the room's
//! current reading.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::models::{clamp_humidity, round_tenths, RoomReading};

pub const HISTORY_HOURS: usize = 24;
pub const HISTORY_TEMPERATURE_JITTER_C: f64 = 2.0;
pub const HISTORY_HUMIDITY_JITTER: i32 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TimeRange {
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[default]
    #[serde(rename = "24h")]
    Day,
}

impl TimeRange {
    pub fn hours(self) -> usize {
        match self {
            TimeRange::SixHours => 6,
            TimeRange::TwelveHours => 12,
            TimeRange::Day => 24,
        }
    }
}

impl FromStr for TimeRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "6h" => Ok(Self::SixHours),
            "12h" => Ok(Self::TwelveHours),
            "24h" => Ok(Self::Day),
            other => Err(anyhow::anyhow!("unknown time range: {other:?}")),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h", self.hours())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryPoint {
    pub recorded_at: DateTime<Utc>,
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity percentage
    pub humidity: u8,
}

/// Hourly points ending at `now`, oldest first, trimmed to `range`.
pub fn synthesize<R: Rng + ?Sized>(
    room: &RoomReading,
    range: TimeRange,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<HistoryPoint> {
    let mut points: Vec<HistoryPoint> = (0..HISTORY_HOURS)
        .map(|hours_ago| {
            let delta = rng.random_range(-HISTORY_TEMPERATURE_JITTER_C..=HISTORY_TEMPERATURE_JITTER_C);
            let humidity_delta = rng.random_range(-HISTORY_HUMIDITY_JITTER..=HISTORY_HUMIDITY_JITTER);
            HistoryPoint {
                recorded_at: now - Duration::hours(hours_ago as i64),
                temperature: round_tenths(room.temperature + delta),
                humidity: clamp_humidity(i32::from(room.humidity) + humidity_delta),
            }
        })
        .collect();
    points.reverse();

    let skip = HISTORY_HOURS - range.hours();
    points.split_off(skip)
}
