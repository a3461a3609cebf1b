//! Bounded in-memory feedback store.

use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::base::types::{FeedbackEntry, Res};

use super::{FeedbackStore, GenericFeedbackStore};

// Extra methods on `FeedbackStore` applied by the memory implementation.

impl FeedbackStore {
    /// Creates an in-memory store that keeps the newest `capacity` entries.
    pub fn memory(capacity: usize) -> Self {
        Self {
            inner: Arc::new(MemoryFeedbackStore::new(capacity)),
        }
    }
}

/// In-memory store; entries are lost on restart.
pub struct MemoryFeedbackStore {
    capacity: usize,
    entries: RwLock<VecDeque<FeedbackEntry>>,
}

impl MemoryFeedbackStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }
}

#[async_trait]
impl GenericFeedbackStore for MemoryFeedbackStore {
    #[instrument(name = "MemoryFeedbackStore::record", skip_all)]
    async fn record(&self, entry: FeedbackEntry) -> Res<usize> {
        let mut entries = self.entries.write().await;

        entries.push_back(entry);

        while entries.len() > self.capacity {
            entries.pop_front();
        }

        debug!("Feedback recorded; {} entries retained.", entries.len());

        Ok(entries.len())
    }

    async fn list(&self) -> Res<Vec<FeedbackEntry>> {
        Ok(self.entries.read().await.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn retains_the_newest_entries_in_order() {
        let store = FeedbackStore::memory(500);

        for i in 0..501 {
            store.record(FeedbackEntry::new(&format!("message {i}"), None)).await.unwrap();
        }

        let entries = store.list().await.unwrap();

        assert_eq!(entries.len(), 500);
        assert!(entries.iter().all(|e| e.message != "message 0"));
        assert_eq!(entries.first().unwrap().message, "message 1");
        assert_eq!(entries.last().unwrap().message, "message 500");
        assert!(entries.windows(2).enumerate().all(|(i, w)| w[0].message == format!("message {}", i + 1) && w[1].message == format!("message {}", i + 2)));
    }

    #[tokio::test]
    async fn record_returns_running_total() {
        let store = FeedbackStore::memory(2);

        assert_eq!(store.record(FeedbackEntry::new("a", None)).await.unwrap(), 1);
        assert_eq!(store.record(FeedbackEntry::new("b", Some("me@example.com"))).await.unwrap(), 2);
        assert_eq!(store.record(FeedbackEntry::new("c", None)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn entry_without_contact_is_listed() {
        let store = FeedbackStore::memory(10);

        store.record(FeedbackEntry::new("Please add a housing checklist", None)).await.unwrap();

        let entries = store.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "Please add a housing checklist");
        assert_eq!(entries[0].contact, None);
    }
}
