pub mod alerts;

use std::{collections::VecDeque, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

pub use alerts::AlertWatcher;

/// Oldest notifications are dropped once the inbox holds this many.
pub const INBOX_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub severity: Option<Severity>,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

struct Inbox {
    /// Newest first.
    items: VecDeque<Notification>,
    unread: usize,
    capacity: usize,
}

/// In-memory notification list shared between the alert watcher and the API.
///
/// Holds at most [`INBOX_CAPACITY`] entries; adding past that evicts the
/// oldest one.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<RwLock<Inbox>>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::with_capacity(INBOX_CAPACITY)
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(RwLock::new(Inbox {
                items: VecDeque::with_capacity(capacity),
                unread: 0,
                capacity,
            })),
        }
    }

    pub async fn add(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        severity: Option<Severity>,
    ) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            severity,
            timestamp: Utc::now(),
            read: false,
        };

        let mut inbox = self.inner.write().await;
        if inbox.items.len() == inbox.capacity {
            if let Some(evicted) = inbox.items.pop_back() {
                if !evicted.read {
                    inbox.unread = inbox.unread.saturating_sub(1);
                }
            }
        }
        inbox.items.push_front(notification.clone());
        inbox.unread += 1;
        notification
    }

    pub async fn list(&self) -> Vec<Notification> {
        self.inner.read().await.items.iter().cloned().collect()
    }

    pub async fn unread_count(&self) -> usize {
        self.inner.read().await.unread
    }

    /// Returns `false` when no notification has this id.
    pub async fn mark_read(&self, id: Uuid) -> bool {
        let mut inbox = self.inner.write().await;
        let Some(n) = inbox.items.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        if !n.read {
            n.read = true;
            inbox.unread = inbox.unread.saturating_sub(1);
        }
        true
    }

    pub async fn mark_all_read(&self) {
        let mut inbox = self.inner.write().await;
        inbox.items.iter_mut().for_each(|n| n.read = true);
        inbox.unread = 0;
    }

    /// Returns `false` when no notification has this id.
    pub async fn remove(&self, id: Uuid) -> bool {
        let mut inbox = self.inner.write().await;
        let Some(pos) = inbox.items.iter().position(|n| n.id == id) else {
            return false;
        };
        let Some(removed) = inbox.items.remove(pos) else {
            return false;
        };
        if !removed.read {
            inbox.unread = inbox.unread.saturating_sub(1);
        }
        true
    }
}
