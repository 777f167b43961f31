//! Target application readiness probe.
//!
//! The fleet console is externally managed; the runner never spawns it.
//! Before a suite run we poll the console's entry route until any HTTP
//! response arrives, so scenario failures mean UI regressions rather
//! than a server that was still booting.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{RunnerError, RunnerResult};

#[derive(Debug, Clone)]
pub struct TargetConfig {
    /// Origin of the application under test
    pub base_url: String,

    /// Route probed for readiness
    pub ready_path: String,

    /// How long to keep probing before giving up
    pub ready_timeout: Duration,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            ready_path: "/fleet".to_string(),
            ready_timeout: Duration::from_secs(30),
        }
    }
}

/// Poll the target until it responds or the timeout expires
pub async fn wait_until_ready(config: &TargetConfig) -> RunnerResult<()> {
    let url = format!("{}{}", config.base_url, config.ready_path);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = std::time::Instant::now();
    let mut attempts = 0;

    while start.elapsed() < config.ready_timeout {
        attempts += 1;

        match client.get(&url).send().await {
            Ok(resp) => {
                // any response means the app is up; a non-2xx entry route
                // is the scenarios' problem, not a readiness failure
                if !resp.status().is_success() {
                    warn!("readiness probe returned {}", resp.status());
                }
                return Ok(());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("waiting for target application at {}...", url);
                }
                // connection refused is expected while the app is starting
                if !e.is_connect() {
                    warn!("readiness probe error: {}", e);
                }
            }
        }

        sleep(Duration::from_millis(250)).await;
    }

    Err(RunnerError::TargetUnreachable { url, attempts })
}
