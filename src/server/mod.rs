//! HTTP surface: two JSON endpoints plus the single-page frontend.
//!
//! Routing is a fixed table. `POST /api/submit` and any method on
//! `/api/history` are special; every other request, including non-POST
//! methods on the submit path, falls through to the page.

mod handlers;
mod page;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{any, post};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::consts::{HISTORY_PATH, SUBMIT_PATH};
use crate::engine::Summarizer;

pub use page::INDEX_HTML;

/// Shared by every handler. Cloning only bumps the `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub summarizer: Arc<Summarizer>,
}

impl AppState {
    pub fn new(summarizer: Summarizer) -> Self {
        Self {
            summarizer: Arc::new(summarizer),
        }
    }
}

/// Build the router. Exposed separately from [`serve`] so tests can drive
/// it in-process.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(SUBMIT_PATH, post(handlers::submit).fallback(page::index))
        .route(HISTORY_PATH, any(handlers::history))
        .fallback(page::index)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // If the handler cannot be installed, run until killed.
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
