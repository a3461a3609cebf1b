//! Reference content used to ground model answers.
//!
//! The module defines the `GenericContentClient` trait, a blog scraper that
//! implements it, and a caching wrapper that refreshes any client in the background.

pub mod blog;
pub mod cached;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Res;

// Traits.

/// Generic content client trait that clients must implement.
#[async_trait]
pub trait GenericContentClient: Send + Sync + 'static {
    /// Fetch reference text for the prompt.
    ///
    /// Errors signal that no usable content is available; callers substitute fallback text.
    async fn fetch_context(&self) -> Res<String>;
}

// Structs.

/// Content client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ContentClient {
    inner: Arc<dyn GenericContentClient>,
}

impl Deref for ContentClient {
    type Target = dyn GenericContentClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ContentClient {
    pub fn new(inner: Arc<dyn GenericContentClient>) -> Self {
        Self { inner }
    }
}
