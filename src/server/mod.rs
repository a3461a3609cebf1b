//! HTTP surface for usa-guide.
//!
//! Routes:
//! - `GET /` serves the single-page app.
//! - `GET /healthz` reports Vertex AI configuration.
//! - `POST /ask` answers a free-form question (with optional follow-up).
//! - `POST /{category}` answers a category form (e.g. `/visa`, `/tax`).
//! - `POST /feedback` records feedback; `GET /feedback` lists it.

pub mod error;
pub mod extract;
pub mod handlers;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{base::types::Void, runtime::Runtime};

/// Build the application router.
pub fn router(runtime: Runtime) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/ask", post(handlers::ask))
        .route("/feedback", get(handlers::list_feedback).post(handlers::post_feedback))
        .route("/{category}", post(handlers::topic))
        .layer(TraceLayer::new_for_http())
        .with_state(runtime)
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(runtime: Runtime) -> Void {
    let addr = runtime.config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("Listening on {addr}.");

    axum::serve(listener, router(runtime)).with_graceful_shutdown(shutdown_signal()).await?;

    info!("Server stopped.");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {err}");
    }
}
