//! Background-refreshed cache over another content client.

use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{Instrument, info, instrument, warn};

use crate::base::types::Res;

use super::{ContentClient, GenericContentClient};

/// Content client that serves the last successfully fetched text.
///
/// The cache starts empty; until the first refresh succeeds, `fetch_context` errors so the
/// caller falls back to static content.
pub struct CachedContentClient {
    source: ContentClient,
    cache: RwLock<Option<String>>,
}

impl CachedContentClient {
    pub fn new(source: ContentClient) -> Self {
        Self {
            source,
            cache: RwLock::new(None),
        }
    }

    /// Fetch from the source and replace the cached text on success.
    ///
    /// A failed fetch keeps whatever was cached before.
    #[instrument(name = "CachedContentClient::refresh", skip_all)]
    pub async fn refresh(&self) -> Res<usize> {
        let content = self.source.fetch_context().await?;
        let len = content.len();

        *self.cache.write().await = Some(content);

        Ok(len)
    }

    /// Spawn a task that refreshes the cache immediately and then on every `period`.
    pub fn spawn_refresh(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let this = self.clone();

        tokio::spawn(
            async move {
                let mut interval = tokio::time::interval(period);

                loop {
                    interval.tick().await;

                    match this.refresh().await {
                        Ok(len) => info!("Refreshed blog context ({len} bytes)."),
                        Err(err) => warn!("Blog refresh failed; keeping previous content: {err}"),
                    }
                }
            }
            .in_current_span(),
        )
    }
}

#[async_trait]
impl GenericContentClient for CachedContentClient {
    async fn fetch_context(&self) -> Res<String> {
        self.cache
            .read()
            .await
            .clone()
            .ok_or_else(|| anyhow!("Blog context has not been fetched yet."))
    }
}
