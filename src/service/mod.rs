//! Service integrations for external APIs and storage.
//!
//! This module contains implementations for the services used by usa-guide:
//! - Content services (e.g., blog scraping)
//! - Feedback storage (e.g., in-memory)
//! - LLM services (e.g., Vertex AI Gemini)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod content;
pub mod feedback;
pub mod llm;
