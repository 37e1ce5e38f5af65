use std::{sync::Arc, time::Duration};

use tokio::sync::watch;
use tracing::{info, warn};

use super::{models::Preferences, PreferenceError};
use crate::storage::{KeyValueStore, StorageError, PREFERENCES_KEY};

/// Persisted preferences plus the in-memory copy everything else reads.
///
/// Cloning is cheap; clones share the same current value and subscribers.
#[derive(Clone)]
pub struct PreferenceStore {
    store: Arc<dyn KeyValueStore>,
    current: Arc<watch::Sender<Preferences>>,
}

impl PreferenceStore {
    /// Read the persisted record once. Never fails: a store error or an
    /// unusable record leaves the defaults in place.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let prefs = match store.get(PREFERENCES_KEY).await {
            Ok(Some(value)) => Preferences::from_stored(&value),
            Ok(None) => Preferences::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read preferences; using defaults");
                Preferences::default()
            }
        };

        info!(
            refresh_interval = prefs.refresh_interval,
            unit = %prefs.temperature_unit,
            theme = %prefs.theme,
            "Preferences loaded"
        );

        let (current, _) = watch::channel(prefs);
        Self {
            store,
            current: Arc::new(current),
        }
    }

    pub fn current(&self) -> Preferences {
        self.current.borrow().clone()
    }

    pub fn refresh_interval(&self) -> Duration {
        self.current.borrow().refresh_period()
    }

    /// Overwrite the whole record and publish it to subscribers.
    pub async fn save(&self, prefs: Preferences) -> Result<Preferences, PreferenceError> {
        if prefs.refresh_interval == 0 {
            return Err(PreferenceError::InvalidRefreshInterval(0));
        }

        let value = serde_json::to_value(&prefs).map_err(|source| StorageError::Encode {
            key: PREFERENCES_KEY.to_owned(),
            source,
        })?;
        self.store.set(PREFERENCES_KEY, value).await?;

        info!(
            refresh_interval = prefs.refresh_interval,
            unit = %prefs.temperature_unit,
            theme = %prefs.theme,
            notifications = prefs.notifications,
            "Preferences saved"
        );
        self.current.send_replace(prefs.clone());
        Ok(prefs)
    }

    pub fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.current.subscribe()
    }
}
