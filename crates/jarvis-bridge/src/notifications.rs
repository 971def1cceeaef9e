//! Host-to-mobile notification mailbox.
//!
//! The host appends records; the phone polls and takes everything that is
//! pending. Records live only in memory for the lifetime of the process.

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// A single pending notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub title: String,
    pub body: String,
}

impl NotificationRecord {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Insertion-ordered mailbox shared by every request handler.
///
/// Appends and drains take the same lock, so a drain returns a consistent
/// snapshot and a concurrent append ends up either in that snapshot or in the
/// queue afterwards.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    records: Mutex<Vec<NotificationRecord>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to the end of the queue.
    pub async fn append(&self, record: NotificationRecord) {
        self.records.lock().await.push(record);
    }

    /// Remove and return every pending record, oldest first.
    pub async fn drain_all(&self) -> Vec<NotificationRecord> {
        std::mem::take(&mut *self.records.lock().await)
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}
