use std::{fmt, str::FromStr};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Battery percentage at or below which a reporting sensor counts as low.
pub const LOW_BATTERY_PERCENT: u8 = 20;
/// Battery percentage above which a sensor counts as healthy.
pub const GOOD_BATTERY_PERCENT: u8 = 50;

// ---------------------------------------------------------------------------
// DeviceStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Online,
    Offline,
    Warning,
}

impl DeviceStatus {
    pub const ALL: [DeviceStatus; 3] = [Self::Online, Self::Offline, Self::Warning];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Warning => "warning",
        }
    }
}

impl FromStr for DeviceStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "warning" => Ok(Self::Warning),
            other => Err(anyhow::anyhow!("unknown device status: {other:?}")),
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device list filter: `None` shows every device.
pub fn parse_status_filter(raw: Option<&str>) -> Result<Option<DeviceStatus>> {
    match raw {
        None | Some("all") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Temperature,
    Humidity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BatteryLevel {
    Good,
    Fair,
    Low,
}

impl BatteryLevel {
    pub fn from_percent(percent: u8) -> Self {
        if percent > GOOD_BATTERY_PERCENT {
            Self::Good
        } else if percent > LOW_BATTERY_PERCENT {
            Self::Fair
        } else {
            Self::Low
        }
    }
}

/// A classroom sensor as last reported to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Device {
    pub id: u32,
    pub name: String,
    pub kind: SensorKind,
    pub status: DeviceStatus,
    /// Battery charge, percent (0–100)
    pub battery: u8,
    pub last_seen: DateTime<Utc>,
}

impl Device {
    /// Offline sensors report no battery level.
    pub fn battery_level(&self) -> Option<BatteryLevel> {
        (self.status != DeviceStatus::Offline).then(|| BatteryLevel::from_percent(self.battery))
    }

    pub fn needs_battery(&self) -> bool {
        self.battery_level() == Some(BatteryLevel::Low)
    }
}

// ---------------------------------------------------------------------------
// DeviceCounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeviceCounts {
    pub online: usize,
    pub offline: usize,
    pub warning: usize,
}

impl DeviceCounts {
    pub fn from_devices(devices: &[Device]) -> Self {
        devices.iter().fold(Self::default(), |mut acc, d| {
            match d.status {
                DeviceStatus::Online => acc.online += 1,
                DeviceStatus::Offline => acc.offline += 1,
                DeviceStatus::Warning => acc.warning += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.online + self.offline + self.warning
    }
}
