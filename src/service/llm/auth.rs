//! OAuth access tokens for Vertex AI.

use std::time::{Duration, Instant};

use anyhow::anyhow;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::base::{config::Config, types::Res};

/// Lifetime assumed for a statically configured token.
const STATIC_TOKEN_TTL: Duration = Duration::from_secs(3300);
/// Metadata tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: u64 = 30;
/// Lower bound on how long a metadata token is cached.
const MIN_TOKEN_TTL_SECS: u64 = 30;

fn default_expires_in() -> u64 {
    300
}

/// Token payload returned by the GCE metadata server.
#[derive(Debug, Deserialize)]
struct MetadataToken {
    #[serde(default)]
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Provides bearer tokens, preferring a configured token over the metadata server.
///
/// Tokens are cached until shortly before expiry.
pub struct AccessTokenProvider {
    client: reqwest::Client,
    static_token: Option<String>,
    metadata_url: String,
    cache: Mutex<Option<CachedToken>>,
}

impl AccessTokenProvider {
    pub fn new(config: &Config) -> Res<Self> {
        let client = reqwest::Client::builder().connect_timeout(Duration::from_millis(1500)).timeout(Duration::from_secs(2)).build()?;

        let static_token = config.google_oauth_access_token.as_deref().map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);

        Ok(Self {
            client,
            static_token,
            metadata_url: config.metadata_token_url.clone(),
            cache: Mutex::new(None),
        })
    }

    /// Get a valid access token.
    #[instrument(name = "AccessTokenProvider::token", skip_all)]
    pub async fn token(&self) -> Res<String> {
        let mut cache = self.cache.lock().await;

        if let Some(cached) = cache.as_ref().filter(|c| c.expires_at > Instant::now()) {
            return Ok(cached.value.clone());
        }

        let (value, ttl) = match &self.static_token {
            Some(token) => (token.clone(), STATIC_TOKEN_TTL),
            None => self.fetch_metadata_token().await?,
        };

        *cache = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + ttl,
        });

        Ok(value)
    }

    async fn fetch_metadata_token(&self) -> Res<(String, Duration)> {
        debug!("Requesting access token from the metadata server.");

        let response = self.client.get(&self.metadata_url).header("Metadata-Flavor", "Google").send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Metadata server returned status {}.", response.status()));
        }

        let token: MetadataToken = response.json().await?;

        if token.access_token.is_empty() {
            return Err(anyhow!("Metadata server returned an empty access token."));
        }

        let ttl = token.expires_in.saturating_sub(EXPIRY_MARGIN_SECS).max(MIN_TOKEN_TTL_SECS);

        Ok((token.access_token, Duration::from_secs(ttl)))
    }
}
