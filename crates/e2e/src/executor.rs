//! Scenario and suite orchestration.
//!
//! Each scenario runs to completion in a single logical flow: compile the
//! program, acquire a session, drain step events under a wall-clock
//! deadline, release the session, then fold the events into a verdict.
//! Scenarios are independent and run sequentially, each owning its own
//! session; the only shared resource is the application under test.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::error::{RunnerError, RunnerResult};
use crate::scenario::Scenario;
use crate::script::build_program;
use crate::session::{BrowserConfig, Session};
use crate::stability::StabilityConfig;
use crate::target::{self, TargetConfig};
use crate::verdict::{fold_events, Event, ScenarioReport, SuiteReport, Verdict};

/// Scenario lifecycle. Never re-enters `Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScenarioState {
    Init,
    Running,
    Passed,
    Failed,
    TornDown,
}

impl fmt::Display for ScenarioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScenarioState::Init => "init",
            ScenarioState::Running => "running",
            ScenarioState::Passed => "passed",
            ScenarioState::Failed => "failed",
            ScenarioState::TornDown => "torn_down",
        };
        f.write_str(s)
    }
}

/// Configuration for the scenario runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub target: TargetConfig,
    pub browser: BrowserConfig,
    pub stability: StabilityConfig,
    pub scenarios_dir: PathBuf,
    pub output_dir: PathBuf,
    pub skip_ready_check: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            target: TargetConfig::default(),
            browser: BrowserConfig::default(),
            stability: StabilityConfig::default(),
            scenarios_dir: PathBuf::from("scenarios"),
            output_dir: PathBuf::from("test-results"),
            skip_ready_check: false,
        }
    }
}

/// Runs scenarios and accounts for the suite
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Run every scenario in the scenarios directory
    pub async fn run_all(&self) -> RunnerResult<SuiteReport> {
        let scenarios = Scenario::load_all(&self.config.scenarios_dir)?;
        self.run_scenarios(&scenarios).await
    }

    /// Run scenarios matching a tag
    pub async fn run_tagged(&self, tag: &str) -> RunnerResult<SuiteReport> {
        let scenarios = Scenario::load_all(&self.config.scenarios_dir)?;
        let filtered: Vec<Scenario> = scenarios
            .into_iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect();
        self.run_scenarios(&filtered).await
    }

    /// Run a single scenario by name
    pub async fn run_named(&self, name: &str) -> RunnerResult<ScenarioReport> {
        let scenarios = Scenario::load_all(&self.config.scenarios_dir)?;
        let scenario = scenarios
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| RunnerError::ScenarioNotFound(name.to_string()))?;

        self.ensure_target_ready().await?;
        self.run_scenario(&scenario).await
    }

    async fn ensure_target_ready(&self) -> RunnerResult<()> {
        if self.config.skip_ready_check {
            return Ok(());
        }
        target::wait_until_ready(&self.config.target).await
    }

    /// Run a list of scenarios sequentially
    pub async fn run_scenarios(&self, scenarios: &[Scenario]) -> RunnerResult<SuiteReport> {
        let start = Instant::now();

        self.ensure_target_ready().await?;

        info!("Running {} scenario(s)...", scenarios.len());

        let mut reports = Vec::new();
        let mut passed = 0;
        let mut failed = 0;

        for scenario in scenarios {
            let report = self.run_scenario(scenario).await?;
            if report.verdict.is_pass() {
                passed += 1;
                info!("✓ {} ({} ms)", report.name, report.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} - {}",
                    report.name,
                    report.verdict.diagnostic().unwrap_or("unknown failure")
                );
            }
            reports.push(report);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        Ok(SuiteReport {
            total: scenarios.len(),
            passed,
            failed,
            duration_ms,
            reports,
        })
    }

    /// Run one scenario in its own session.
    ///
    /// The session is released on every path out of this function: after a
    /// clean drain, after a deadline expiry, and (via the session's drop
    /// backstop) if the runner itself unwinds.
    pub async fn run_scenario(&self, scenario: &Scenario) -> RunnerResult<ScenarioReport> {
        let start = Instant::now();
        let mut state = ScenarioState::Init;
        debug!(scenario = %scenario.name, %state, "compiling scenario program");

        let program = build_program(
            scenario,
            &self.config.browser,
            &self.config.stability,
            &self.config.target.base_url,
        );

        let mut session = Session::launch(&program).await?;
        state = ScenarioState::Running;
        debug!(scenario = %scenario.name, %state, "session acquired");

        let deadline = Duration::from_millis(self.config.stability.scenario_deadline_ms);
        let mut events: Vec<Event> = Vec::new();
        let drained = tokio::time::timeout(deadline, async {
            while let Some(event) = session.next_event().await {
                if let Event::Step(step) = &event {
                    debug!(scenario = %scenario.name, step = %step.name, outcome = ?step.outcome, "step");
                }
                let is_done = matches!(event, Event::Done { .. });
                events.push(event);
                if is_done {
                    break;
                }
            }
        })
        .await;

        // release before the verdict so teardown can never mask it
        session.release().await;

        let verdict = if drained.is_err() {
            warn!(scenario = %scenario.name, "scenario deadline exceeded");
            Verdict::Fail {
                diagnostic: format!("scenario exceeded the {} ms deadline", deadline.as_millis()),
            }
        } else {
            fold_events(&scenario.on_fail, &events)
        };

        state = if verdict.is_pass() {
            ScenarioState::Passed
        } else {
            ScenarioState::Failed
        };
        debug!(scenario = %scenario.name, %state, "verdict reached");
        state = ScenarioState::TornDown;
        debug!(scenario = %scenario.name, %state, "session released");

        let steps = events
            .into_iter()
            .filter_map(|e| match e {
                Event::Step(step) => Some(step),
                _ => None,
            })
            .collect();

        Ok(ScenarioReport {
            name: scenario.name.clone(),
            verdict,
            duration_ms: start.elapsed().as_millis() as u64,
            steps,
        })
    }

    /// Write the suite report as pretty JSON under the output directory
    pub fn write_report(&self, report: &SuiteReport) -> RunnerResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("scenario-results.json");
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
