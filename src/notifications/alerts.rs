use std::collections::HashMap;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use super::{NotificationCenter, NotificationKind, Severity};
use crate::{
    comfort::Comfort,
    pipeline::{PipelineEvent, RefreshPipeline},
    preferences::PreferenceStore,
    readings::RoomReading,
};

/// Raises a notification whenever a room moves into the hot band.
pub struct AlertWatcher {
    pipeline: RefreshPipeline,
    preferences: PreferenceStore,
    notifications: NotificationCenter,
    events: broadcast::Receiver<PipelineEvent>,
    last_seen: HashMap<u32, Comfort>,
}

impl AlertWatcher {
    /// Rooms that are already hot at construction do not alert.
    pub async fn new(
        pipeline: RefreshPipeline,
        preferences: PreferenceStore,
        notifications: NotificationCenter,
    ) -> Self {
        let events = pipeline.subscribe();
        let last_seen = comfort_by_room(&pipeline.rooms().await);
        Self {
            pipeline,
            preferences,
            notifications,
            events,
            last_seen,
        }
    }

    /// Runs until the pipeline stops or its event channel closes.
    /// Spawn this via `tokio::spawn`.
    pub async fn run(mut self) {
        info!("Alert watcher started");
        loop {
            match self.events.recv().await {
                Ok(PipelineEvent::SnapshotChanged { rooms, .. }) => self.check(&rooms).await,
                Ok(PipelineEvent::Stopped) | Err(RecvError::Closed) => break,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Alert watcher lagged; comparing against latest snapshot");
                    let rooms = self.pipeline.rooms().await;
                    self.check(&rooms).await;
                }
            }
        }
        info!("Alert watcher stopped");
    }

    async fn check(&mut self, rooms: &[RoomReading]) {
        let enabled = self.preferences.current().notifications;

        for room in rooms {
            let was = self.last_seen.get(&room.id).copied();
            if room.comfort == Comfort::Hot && was != Some(Comfort::Hot) && enabled {
                info!(room = %room.name, temperature = room.temperature, "Room turned hot");
                self.notifications
                    .add(
                        NotificationKind::Warning,
                        format!("{} temperature exceeds threshold", room.name),
                        Some(Severity::High),
                    )
                    .await;
            }
        }

        self.last_seen = comfort_by_room(rooms);
    }
}

fn comfort_by_room(rooms: &[RoomReading]) -> HashMap<u32, Comfort> {
    rooms.iter().map(|r| (r.id, r.comfort)).collect()
}
