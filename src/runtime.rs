//! Runtime services and shared state for usa-guide.

use std::{sync::Arc, time::Duration};

use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    server,
    service::{
        content::{ContentClient, cached::CachedContentClient},
        feedback::FeedbackStore,
        llm::LlmClient,
    },
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration and every service client. It is designed to be
/// trivially cloneable, allowing it to be passed around (and used as router state)
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The reference content client instance.
    pub content: ContentClient,
    /// The feedback store instance.
    pub feedback: FeedbackStore,
    /// The blog cache, when content is refreshed in the background.
    pub blog_cache: Option<Arc<CachedContentClient>>,
}

impl Runtime {
    /// Create a new runtime instance.
    ///
    /// When `blog_refresh_secs` is non-zero, blog content is served from a cache that
    /// [`Runtime::start`] keeps fresh; otherwise every request fetches the blog live.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the LLM client.
        let llm = LlmClient::vertex(&config)?;

        // Initialize the content client.
        let blog = ContentClient::blog(&config)?;

        let (content, blog_cache) = if config.blog_refresh_secs > 0 {
            let cached = Arc::new(CachedContentClient::new(blog));

            (ContentClient::new(cached.clone()), Some(cached))
        } else {
            info!("Blog content is fetched on every request.");

            (blog, None)
        };

        // Initialize the feedback store.
        let feedback = FeedbackStore::memory(config.feedback_capacity);

        match config.project() {
            Some(project) => info!("Using Vertex AI project `{}` in `{}` with model `{}`.", project, config.vertex_location, config.gemini_model),
            None => info!("No Google Cloud project configured; answers will use fallback mode."),
        }

        Ok(Self {
            config,
            llm,
            content,
            feedback,
            blog_cache,
        })
    }

    /// Start the blog refresher (if any) and serve HTTP until shutdown.
    pub async fn start(&self) -> Void {
        if let Some(cache) = &self.blog_cache {
            cache.spawn_refresh(Duration::from_secs(self.config.blog_refresh_secs));

            info!("Blog content refreshes every {} seconds.", self.config.blog_refresh_secs);
        }

        server::serve(self.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::method,
    };

    use super::*;
    use crate::base::config::ConfigInner;

    #[tokio::test]
    async fn new_does_not_fetch_blog_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let config = Config {
            inner: Arc::new(ConfigInner {
                blog_urls: vec![server.uri()],
                blog_refresh_secs: 3600,
                ..Default::default()
            }),
        };

        let runtime = Runtime::new(config).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        assert!(runtime.blog_cache.is_some());
        server.verify().await;
    }

    #[tokio::test]
    async fn live_fetch_has_no_cache() {
        let config = Config {
            inner: Arc::new(ConfigInner {
                blog_refresh_secs: 0,
                ..Default::default()
            }),
        };

        let runtime = Runtime::new(config).await.unwrap();

        assert!(runtime.blog_cache.is_none());
    }
}
