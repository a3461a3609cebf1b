//! Library root for `usa-guide`.
//!
//! usa-guide is a single-page web application that answers questions about living
//! in the USA (visas, SSN, taxes, banking, housing, and more):
//! - Enriches each question with reference text scraped from a blog
//! - Sends the assembled prompt to Vertex AI Gemini
//! - Falls back to a static summary when the model or the blog is unavailable
//! - Keeps a bounded in-memory feedback log
//!
//! The architecture is built around extensible traits so each external
//! service can be swapped or mocked.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod server;
pub mod service;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the usa-guide runtime:
/// - Creates the runtime context with LLM, content, and feedback clients
/// - Serves HTTP until Ctrl-C
pub async fn start(config: Config) -> Void {
    info!("Starting usa-guide ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
