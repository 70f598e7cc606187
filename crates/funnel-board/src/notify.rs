use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Where the board reports outcomes the operator should see.
///
/// Fire-and-forget: the board never waits on or inspects the result.
pub trait NotificationSink: Send + Sync {
    fn report(&self, kind: NotificationKind, title: &str, message: &str);
}

/// Bounded in-memory history of reported notifications, oldest evicted first.
#[derive(Debug)]
pub struct NotificationLog {
    entries: Mutex<VecDeque<Notification>>,
    max_entries: usize,
}

impl NotificationLog {
    pub fn new(max: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            max_entries: max.max(1),
        }
    }

    pub fn list(&self) -> Vec<Notification> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.lock().iter().filter(|n| n.kind == kind).count()
    }

    pub fn last(&self) -> Option<Notification> {
        self.lock().back().cloned()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Notification>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl NotificationSink for NotificationLog {
    fn report(&self, kind: NotificationKind, title: &str, message: &str) {
        let mut entries = self.lock();
        entries.push_back(Notification {
            id: Uuid::new_v4(),
            kind,
            title: title.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
        });
        while entries.len() > self.max_entries {
            entries.pop_front();
        }
    }
}

/// Forwards notifications to the log instead of a UI.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn report(&self, kind: NotificationKind, title: &str, message: &str) {
        match kind {
            NotificationKind::Success => tracing::info!(title, message, "notification"),
            NotificationKind::Error => tracing::warn!(title, message, "notification"),
        }
    }
}
