use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::{sync::RwLock, time};
use tracing::{debug, info};
use utoipa::ToSchema;

use super::{
    models::{Device, DeviceCounts, DeviceStatus, SensorKind},
    DeviceError,
};
use crate::notifications::{NotificationCenter, NotificationKind, Severity};

/// How long a network scan takes when none is configured.
pub const DEFAULT_SCAN_DURATION: Duration = Duration::from_secs(3);
const SCAN_STEPS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScanReport {
    pub devices_found: usize,
    pub completed_at: DateTime<Utc>,
    /// Sensors flagged for a battery change during this scan.
    pub low_battery: Vec<String>,
}

struct Inventory {
    devices: Vec<Device>,
    last_scan: Option<DateTime<Utc>>,
}

/// Known sensors plus the simulated network scan.
///
/// Cloning is cheap; clones share the inventory and the scan lock.
#[derive(Clone)]
pub struct DeviceRegistry {
    inventory: Arc<RwLock<Inventory>>,
    scanning: Arc<AtomicBool>,
    scan_duration: Duration,
}

/// Clears the scanning flag even if the scan future is dropped mid-way.
struct ScanGuard(Arc<AtomicBool>);

impl Drop for ScanGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl DeviceRegistry {
    pub fn new(devices: Vec<Device>, scan_duration: Duration) -> Self {
        Self {
            inventory: Arc::new(RwLock::new(Inventory {
                devices,
                last_scan: None,
            })),
            scanning: Arc::new(AtomicBool::new(false)),
            scan_duration,
        }
    }

    /// The six sensors installed in the reference classrooms, last seen
    /// relative to `now`.
    pub fn with_reference_devices(now: DateTime<Utc>, scan_duration: Duration) -> Self {
        Self::new(reference_devices(now), scan_duration)
    }

    /// Devices in inventory order, narrowed to `status` when given.
    pub async fn list(&self, status: Option<DeviceStatus>) -> Vec<Device> {
        self.inventory
            .read()
            .await
            .devices
            .iter()
            .filter(|d| status.is_none_or(|s| d.status == s))
            .cloned()
            .collect()
    }

    /// Counts over the whole inventory, independent of any filter.
    pub async fn counts(&self) -> DeviceCounts {
        DeviceCounts::from_devices(&self.inventory.read().await.devices)
    }

    pub async fn last_scan(&self) -> Option<DateTime<Utc>> {
        self.inventory.read().await.last_scan
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning.load(Ordering::Acquire)
    }

    /// Sweep the network for new sensors and check battery levels.
    ///
    /// Posts a success notification with the result plus one notification
    /// per reporting sensor with a low battery. Only one scan runs at a time.
    pub async fn scan(&self, notifications: &NotificationCenter) -> Result<ScanReport, DeviceError> {
        if self
            .scanning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DeviceError::ScanInProgress);
        }
        let _guard = ScanGuard(Arc::clone(&self.scanning));

        info!("Device scan started");
        let step = self.scan_duration / SCAN_STEPS;
        for done in 1..=SCAN_STEPS {
            time::sleep(step).await;
            debug!(progress = done * 100 / SCAN_STEPS, "Scanning for devices");
        }

        // Discovery is simulated; the network never reports new sensors.
        let devices_found = 0;
        let completed_at = Utc::now();

        let low_battery: Vec<String> = {
            let mut inventory = self.inventory.write().await;
            inventory.last_scan = Some(completed_at);
            inventory
                .devices
                .iter()
                .filter(|d| d.needs_battery())
                .map(|d| d.name.clone())
                .collect()
        };

        info!(devices_found, low_battery = low_battery.len(), "Device scan complete");
        notifications
            .add(NotificationKind::Success, scan_message(devices_found), None)
            .await;
        for name in &low_battery {
            notifications
                .add(
                    NotificationKind::Info,
                    format!("{name} battery low"),
                    Some(Severity::Medium),
                )
                .await;
        }

        Ok(ScanReport {
            devices_found,
            completed_at,
            low_battery,
        })
    }
}

fn scan_message(found: usize) -> String {
    let plural = if found == 1 { "" } else { "s" };
    format!("Scan complete! Found {found} new device{plural}.")
}

fn reference_devices(now: DateTime<Utc>) -> Vec<Device> {
    let sensor = |id, kind, status, battery, minutes_ago| Device {
        id,
        name: format!("Sensor R10{id}"),
        kind,
        status,
        battery,
        last_seen: now - TimeDelta::minutes(minutes_ago),
    };
    vec![
        sensor(1, SensorKind::Temperature, DeviceStatus::Online, 85, 2),
        sensor(2, SensorKind::Temperature, DeviceStatus::Online, 92, 1),
        sensor(3, SensorKind::Temperature, DeviceStatus::Offline, 0, 120),
        sensor(4, SensorKind::Humidity, DeviceStatus::Online, 67, 3),
        sensor(5, SensorKind::Temperature, DeviceStatus::Warning, 15, 5),
        sensor(6, SensorKind::Humidity, DeviceStatus::Online, 78, 1),
    ]
}
