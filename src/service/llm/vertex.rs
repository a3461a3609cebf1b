//! Vertex AI Gemini implementation of the LLM client.

use std::{sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::base::{config::Config, types::Res};

use super::{GenericLlmClient, LlmClient, auth::AccessTokenProvider};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Extra methods on `LlmClient` applied by the vertex implementation.

impl LlmClient {
    pub fn vertex(config: &Config) -> Res<Self> {
        let client = VertexLlmClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Wire types.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

// Specific implementations.

/// Vertex AI LLM client implementation.
pub struct VertexLlmClient {
    client: reqwest::Client,
    tokens: AccessTokenProvider,
    config: Config,
}

impl VertexLlmClient {
    /// Create a new Vertex AI LLM client.
    #[instrument(name = "VertexLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let client = reqwest::Client::builder().connect_timeout(CONNECT_TIMEOUT).timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            tokens: AccessTokenProvider::new(config)?,
            config: config.clone(),
        })
    }

    /// The `generateContent` endpoint for the configured project, location, and model.
    fn endpoint(&self, project: &str) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.config.vertex_base_url(),
            project,
            self.config.vertex_location,
            self.config.gemini_model
        )
    }

    fn project(&self) -> Res<&str> {
        self.config
            .project()
            .ok_or_else(|| anyhow!("No Google Cloud project configured (set GOOGLE_CLOUD_PROJECT or GCP_PROJECT)."))
    }
}

#[async_trait]
impl GenericLlmClient for VertexLlmClient {
    #[instrument(name = "VertexLlmClient::generate", skip_all)]
    async fn generate(&self, prompt: &str) -> Res<String> {
        let project = self.project()?;
        let token = self.tokens.token().await?;

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.gemini_max_tokens,
                temperature: self.config.gemini_temperature,
            },
        };

        debug!("Calling Vertex AI model `{}` with a {} byte prompt", self.config.gemini_model, prompt.len());

        let response = self.client.post(self.endpoint(project)).bearer_auth(token).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Vertex AI returned status {status}: {body}");
            return Err(anyhow!("Vertex AI returned status {status}."));
        }

        let response: GenerateContentResponse = response.json().await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| anyhow!("Vertex AI response contained no text."))?;

        info!("Vertex AI call succeeded ({} bytes).", text.len());

        Ok(text)
    }

    async fn is_available(&self) -> bool {
        self.config.project().is_some() && self.tokens.token().await.is_ok()
    }
}
