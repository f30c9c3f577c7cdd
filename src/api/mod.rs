//! API Module
//!
//! HTTP API layer for the webhook service.
//! Each submodule handles endpoints for a specific concern.

pub mod error;
pub mod health;
pub mod run;

use axum::{
    Router,
    routing::{get, post},
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::service::RunLauncher;

/// Shared state available to all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Dispatches accepted runs to the runner script
    pub launcher: Arc<dyn RunLauncher>,
    /// Directory used to construct log_file strings in responses
    pub log_dir: PathBuf,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Run endpoint
        .route("/run-terraform", post(run::run_terraform))
        // Unknown paths and wrong methods both answer 404
        .fallback(error::not_found)
        .method_not_allowed_fallback(error::not_found)
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
