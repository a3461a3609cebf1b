//! User interactions for usa-guide.
//!
//! This module coordinates the services for each kind of request:
//! - Answering questions and category forms (content, prompt, LLM, fallback)
//! - Recording feedback

pub mod ask;
pub mod feedback;
