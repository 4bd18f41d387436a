//! Snapshot store shared by the refresh loop and the scrape handler.
//!
//! The store holds an `Arc<Snapshot>` behind a read/write lock. Readers
//! clone the `Arc` and release the lock; the writer swaps the `Arc`. A
//! document is therefore always complete before anyone can see it.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::collector::CycleReport;

/// A published exposition document with its cycle metadata.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub document: Arc<str>,
    pub published_at: DateTime<Utc>,
    pub processes: usize,
    pub skipped: usize,
    pub cycle_duration: Duration,
}

impl Snapshot {
    pub fn from_report(report: CycleReport) -> Self {
        let skipped = report.skipped_total();
        Self {
            document: Arc::from(report.document),
            published_at: Utc::now(),
            processes: report.sampled,
            skipped,
            cycle_duration: report.duration,
        }
    }

    /// Snapshot carrying only a document, mostly for tests and tools.
    pub fn from_document(document: impl Into<Arc<str>>) -> Self {
        Self {
            document: document.into(),
            published_at: Utc::now(),
            processes: 0,
            skipped: 0,
            cycle_duration: Duration::ZERO,
        }
    }
}

/// One writer, many readers; starts empty.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the visible snapshot.
    pub async fn publish(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        let previous = {
            let mut guard = self.current.write().await;
            std::mem::replace(&mut *guard, Some(next))
        };
        // the old document is freed outside the lock
        drop(previous);
    }

    /// Current document, or an empty one before the first publish.
    pub async fn read(&self) -> Arc<str> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|s| Arc::clone(&s.document))
            .unwrap_or_else(|| Arc::from(""))
    }

    /// Current snapshot including metadata.
    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().await.clone()
    }
}
