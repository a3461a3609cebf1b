//! Integration with Large Language Model services.
//!
//! This module provides a thin wrapper around LLM clients (e.g., Vertex AI Gemini)
//! for generating answers from an assembled prompt.
//!
//! The module defines the `GenericLlmClient` trait that can be implemented
//! for different LLM providers, with a default implementation for Vertex AI.

pub mod auth;
pub mod vertex;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Res;

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// Implementing this trait allows different LLM providers to be used by the guide.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Generate text for a fully assembled prompt.
    ///
    /// Fails when the provider is not configured, credentials are missing, or the
    /// call itself fails. Callers treat any error as "fall back".
    async fn generate(&self, prompt: &str) -> Res<String>;

    /// Whether the provider is configured and credentials can be obtained.
    async fn is_available(&self) -> bool;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}
