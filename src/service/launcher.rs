//! Run launcher service
//!
//! Executes the external runner script for accepted runs. Launches are
//! detached from the HTTP request that triggered them: the response has
//! already been sent by the time the script runs, and failures are only
//! visible in the server logs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::{error, info};

/// A validated provisioning run handed to the launcher
#[derive(Debug, Clone)]
pub struct TerraformRun {
    pub project_name: String,
    pub command: String,
    pub run_id: String,
}

/// Service trait for dispatching runs
#[async_trait]
pub trait RunLauncher: Send + Sync {
    /// Dispatches a run without awaiting its completion
    async fn launch(&self, run: TerraformRun);
}

/// Launches the configured runner script in a detached task
pub struct ScriptLauncher {
    script: PathBuf,

    /// Caps how many scripts execute at once; runs past the cap wait for a
    /// permit inside their detached task, never in the request path
    permits: Arc<Semaphore>,
}

impl ScriptLauncher {
    /// Creates a new launcher for the given script
    pub fn new(script: PathBuf, max_parallel_runs: usize) -> Self {
        Self {
            script,
            permits: Arc::new(Semaphore::new(max_parallel_runs)),
        }
    }

    /// Runs the script to completion with the run's project name and command
    /// as positional arguments
    ///
    /// Fails if the script cannot be spawned or exits non-zero.
    async fn run_script(script: &Path, run: &TerraformRun) -> Result<()> {
        let status = Command::new(script)
            .arg(&run.project_name)
            .arg(&run.command)
            .status()
            .await
            .with_context(|| format!("Failed to execute {}", script.display()))?;

        if !status.success() {
            anyhow::bail!(
                "Runner script for project {} exited with {}",
                run.project_name,
                status
            );
        }

        Ok(())
    }
}

#[async_trait]
impl RunLauncher for ScriptLauncher {
    async fn launch(&self, run: TerraformRun) {
        let script = self.script.clone();
        let permits = self.permits.clone();

        tokio::spawn(async move {
            // acquire_owned only fails if the semaphore is closed, which
            // never happens here
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            info!(
                "Running terraform {} for project {} (run {})",
                run.command, run.project_name, run.run_id
            );

            if let Err(e) = Self::run_script(&script, &run).await {
                error!("Error running Terraform: {:#}", e);
            }
        });
    }
}
