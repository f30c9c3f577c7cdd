//! Service configuration
//!
//! Defines all configurable parameters for the webhook service including
//! the bind address, the runner script location, and the run concurrency cap.

use std::path::PathBuf;

/// Webhook service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to (e.g., "0.0.0.0:8080")
    pub bind_addr: String,

    /// Path of the external runner script invoked for each accepted run
    pub runner_script: PathBuf,

    /// Directory the runner script writes its log files into
    ///
    /// Only used to construct the log_file string returned to callers;
    /// the service itself never touches this directory.
    pub log_dir: PathBuf,

    /// Max runner scripts executing at once; accepted runs past the cap
    /// wait in their dispatch task
    pub max_parallel_runs: usize,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - BIND_ADDR (default: 0.0.0.0:8080)
    /// - RUNNER_SCRIPT (default: /opt/terraform-runner/run-terraform.sh)
    /// - LOG_DIR (default: /home/terraform/logs)
    /// - MAX_PARALLEL_RUNS (default: 4)
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let runner_script = std::env::var("RUNNER_SCRIPT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/opt/terraform-runner/run-terraform.sh"));

        let log_dir = std::env::var("LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/home/terraform/logs"));

        let max_parallel_runs = std::env::var("MAX_PARALLEL_RUNS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(4);

        Self {
            bind_addr,
            runner_script,
            log_dir,
            max_parallel_runs,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if self.runner_script.as_os_str().is_empty() {
            anyhow::bail!("runner_script cannot be empty");
        }

        if self.log_dir.as_os_str().is_empty() {
            anyhow::bail!("log_dir cannot be empty");
        }

        if self.max_parallel_runs == 0 {
            anyhow::bail!("max_parallel_runs must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            runner_script: PathBuf::from("/opt/terraform-runner/run-terraform.sh"),
            log_dir: PathBuf::from("/home/terraform/logs"),
            max_parallel_runs: 4,
        }
    }
}
