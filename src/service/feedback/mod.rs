//! Storage for user feedback.

pub mod memory;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{FeedbackEntry, Res};

// Traits.

/// Generic feedback store trait that stores must implement.
///
/// Implementing this trait allows a persistent backend to replace the in-memory default.
#[async_trait]
pub trait GenericFeedbackStore: Send + Sync + 'static {
    /// Append an entry, returning the number of entries now retained.
    async fn record(&self, entry: FeedbackEntry) -> Res<usize>;

    /// All retained entries, oldest first.
    async fn list(&self) -> Res<Vec<FeedbackEntry>>;
}

// Structs.

/// Feedback store for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct FeedbackStore {
    inner: Arc<dyn GenericFeedbackStore>,
}

impl Deref for FeedbackStore {
    type Target = dyn GenericFeedbackStore;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl FeedbackStore {
    pub fn new(inner: Arc<dyn GenericFeedbackStore>) -> Self {
        Self { inner }
    }
}
