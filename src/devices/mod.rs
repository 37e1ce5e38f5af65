pub mod models;
pub mod registry;

pub use models::{BatteryLevel, Device, DeviceCounts, DeviceStatus, SensorKind};
pub use registry::{DeviceRegistry, ScanReport, DEFAULT_SCAN_DURATION};

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("a device scan is already running")]
    ScanInProgress,
}
