//! Timing and readiness configuration.
//!
//! The runner never emits fixed sleeps. Interactive steps rely on the
//! browser's own actionability polling bounded by the step timeout, and
//! load-state settles are bounded best-effort waits over the page and
//! every nested frame.

use serde::{Deserialize, Serialize};

/// Load state waited for during a settle
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    DomContentLoaded,
    Load,
    NetworkIdle,
}

impl LoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadState::DomContentLoaded => "domcontentloaded",
            LoadState::Load => "load",
            LoadState::NetworkIdle => "networkidle",
        }
    }
}

/// Timing knobs shared by every scenario in a run
#[derive(Debug, Clone)]
pub struct StabilityConfig {
    /// Default timeout applied by the browser context to every action
    pub action_timeout_ms: u64,

    /// Bound for each best-effort load-state wait
    pub settle_timeout_ms: u64,

    /// Load state a settle waits for
    pub load_state: LoadState,

    /// Overall wall-clock deadline for one scenario, child process included
    pub scenario_deadline_ms: u64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            action_timeout_ms: 5_000,
            settle_timeout_ms: 3_000,
            load_state: LoadState::DomContentLoaded,
            scenario_deadline_ms: 120_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_bounded() {
        let config = StabilityConfig::default();
        assert!(config.settle_timeout_ms < config.scenario_deadline_ms);
        assert_eq!(config.load_state.as_str(), "domcontentloaded");
    }
}
