use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    comfort::{Comfort, ComfortCounts},
    devices::{BatteryLevel, Device, DeviceCounts, DeviceStatus, SensorKind},
    notifications::Notification,
    pipeline::{AutoRefresh, DashboardView, Filter},
    preferences::{models::validate_refresh_interval, PreferenceError, Preferences},
    readings::{
        history::{HistoryPoint, TimeRange},
        RoomReading,
    },
    session::User,
    units::{to_display, TemperatureUnit},
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoomDto {
    pub id: u32,
    pub name: String,
    /// Degrees Celsius
    pub temperature: f64,
    /// Temperature rendered in the preferred unit, e.g. `"74.3°F"`.
    pub temperature_display: String,
    /// Relative humidity percentage
    pub humidity: u8,
    pub comfort: Comfort,
}

impl RoomDto {
    pub fn new(room: RoomReading, unit: TemperatureUnit) -> Self {
        Self {
            temperature_display: to_display(room.temperature, unit),
            id: room.id,
            name: room.name,
            temperature: room.temperature,
            humidity: room.humidity,
            comfort: room.comfort,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardDto {
    pub rooms: Vec<RoomDto>,
    pub counts: ComfortCounts,
    pub total: usize,
    pub last_updated: DateTime<Utc>,
    pub generation: u64,
    pub filter: Filter,
    pub auto_refresh: AutoRefresh,
    pub refresh_interval_secs: u64,
    pub temperature_unit: TemperatureUnit,
}

impl DashboardDto {
    pub fn new(view: DashboardView, prefs: &Preferences) -> Self {
        let unit = prefs.temperature_unit;
        Self {
            rooms: view.rooms.into_iter().map(|r| RoomDto::new(r, unit)).collect(),
            counts: view.counts,
            total: view.total,
            last_updated: view.last_updated,
            generation: view.generation,
            filter: view.filter,
            auto_refresh: view.auto_refresh,
            refresh_interval_secs: prefs.refresh_period().as_secs(),
            temperature_unit: unit,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshDto {
    pub generation: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AutoRefreshDto {
    pub auto_refresh: AutoRefresh,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FilterDto {
    pub filter: Filter,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// `6h`, `12h` or `24h` (default).
    pub range: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryPointDto {
    pub recorded_at: DateTime<Utc>,
    /// Degrees Celsius
    pub temperature: f64,
    pub temperature_display: String,
    pub humidity: u8,
}

impl HistoryPointDto {
    pub fn new(point: HistoryPoint, unit: TemperatureUnit) -> Self {
        Self {
            recorded_at: point.recorded_at,
            temperature: point.temperature,
            temperature_display: to_display(point.temperature, unit),
            humidity: point.humidity,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryDto {
    pub room_id: u32,
    pub range: TimeRange,
    pub points: Vec<HistoryPointDto>,
}

/// Body of `PUT /preferences`. Every field is required; the record is
/// replaced as a whole.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesForm {
    pub refresh_interval: i64,
    pub temperature_unit: String,
    pub theme: String,
    pub notifications: bool,
}

impl TryFrom<PreferencesForm> for Preferences {
    type Error = PreferenceError;

    fn try_from(form: PreferencesForm) -> Result<Self, Self::Error> {
        Ok(Self {
            refresh_interval: validate_refresh_interval(form.refresh_interval)?,
            temperature_unit: form.temperature_unit.parse()?,
            theme: form.theme.parse()?,
            notifications: form.notifications,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionDto {
    pub user: Option<User>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NotificationsDto {
    pub unread_count: usize,
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceParams {
    /// `all` (default), `online`, `offline` or `warning`
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeviceDto {
    pub id: u32,
    pub name: String,
    pub kind: SensorKind,
    pub status: DeviceStatus,
    /// Battery percentage; absent while the sensor is offline.
    pub battery: Option<u8>,
    pub battery_level: Option<BatteryLevel>,
    pub last_seen: DateTime<Utc>,
}

impl From<Device> for DeviceDto {
    fn from(d: Device) -> Self {
        Self {
            battery: d.battery_level().map(|_| d.battery),
            battery_level: d.battery_level(),
            id: d.id,
            name: d.name,
            kind: d.kind,
            status: d.status,
            last_seen: d.last_seen,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DevicesDto {
    pub devices: Vec<DeviceDto>,
    /// Counts over all devices, regardless of the status filter.
    pub counts: DeviceCounts,
    /// `null` when every status is shown.
    pub filter: Option<DeviceStatus>,
    pub last_scan: Option<DateTime<Utc>>,
    pub scanning: bool,
}
