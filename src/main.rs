//! Terrahook
//!
//! A webhook service that accepts Terraform provisioning requests over HTTP
//! and dispatches the runner script without blocking the response.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - API: HTTP router and handlers (axum)
//! - Services: Business logic (run dispatch, script execution)
//!
//! The service acknowledges a valid request with 202 immediately; the runner
//! script executes in a detached task and its outcome is only visible in the
//! server logs.

mod api;
mod config;
mod service;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::AppState;
use crate::config::Config;
use crate::service::{RunLauncher, ScriptLauncher};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "terrahook=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Terrahook...");

    // Load configuration
    let config = Config::from_env();
    config.validate()?;

    info!(
        "Loaded configuration: runner_script={}, log_dir={}, max_parallel_runs={}",
        config.runner_script.display(),
        config.log_dir.display(),
        config.max_parallel_runs
    );

    // Requests are accepted regardless; the script is only resolved at run time
    if !config.runner_script.is_file() {
        warn!(
            "Runner script {} does not exist or is not a file",
            config.runner_script.display()
        );
    }

    let launcher: Arc<dyn RunLauncher> = Arc::new(ScriptLauncher::new(
        config.runner_script.clone(),
        config.max_parallel_runs,
    ));

    let state = AppState {
        launcher,
        log_dir: config.log_dir.clone(),
    };

    // Build router with all API endpoints
    let app = api::create_router(state);

    info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
