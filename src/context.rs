use std::sync::Arc;

use chrono::Utc;

use crate::{
    devices::{DeviceRegistry, DEFAULT_SCAN_DURATION},
    notifications::NotificationCenter,
    pipeline::RefreshPipeline,
    preferences::PreferenceStore,
    readings::ReadingGenerator,
    session::SessionStore,
    storage::KeyValueStore,
};

/// Everything a request handler or background task needs, built once at
/// startup and handed out explicitly.
#[derive(Clone)]
pub struct AppContext {
    pub preferences: PreferenceStore,
    pub session: SessionStore,
    pub notifications: NotificationCenter,
    pub pipeline: RefreshPipeline,
    pub devices: DeviceRegistry,
}

impl AppContext {
    /// Loads preferences from `store` and seeds the pipeline. Auto-refresh is
    /// not started.
    pub async fn new(store: Arc<dyn KeyValueStore>, generator: ReadingGenerator) -> Self {
        let preferences = PreferenceStore::load(Arc::clone(&store)).await;
        let pipeline = RefreshPipeline::new(generator, preferences.clone());
        Self {
            session: SessionStore::new(store),
            notifications: NotificationCenter::new(),
            devices: DeviceRegistry::with_reference_devices(Utc::now(), DEFAULT_SCAN_DURATION),
            preferences,
            pipeline,
        }
    }

    pub fn with_devices(mut self, devices: DeviceRegistry) -> Self {
        self.devices = devices;
        self
    }
}
