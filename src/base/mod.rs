//! Core components, types, and utilities for usa-guide.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Prompt templates and answer shaping for LLM interactions.
//! - Common types and result handling.

pub mod config;
pub mod prompts;
pub mod types;
