//! Fleet Console E2E Scenario Runner
//!
//! This crate drives the fleet-management web console through Playwright:
//! - Parses declarative YAML scenarios (login, navigate, fill, click, assert)
//! - Compiles each scenario into a standalone Playwright program
//! - Runs the program under `node` in an isolated browser session
//! - Folds the program's step events into a Pass/Fail verdict
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Scenario Runner (Rust)                     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Runner                                                     │
//! │    ├── run_scenario(Scenario) -> ScenarioReport             │
//! │    ├── build_program(Scenario) -> Playwright JS             │
//! │    ├── Session::launch(program) -> Session (node child)     │
//! │    └── fold_events([Event]) -> Verdict                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (YAML)                                            │
//! │    ├── name, entry, on_fail                                 │
//! │    └── steps: [Step]                                        │
//! │          ├── navigate { url }                               │
//! │          ├── wait_for_load { timeout_ms }   (best-effort)   │
//! │          ├── fill { locator, value }                        │
//! │          ├── click { locator }                              │
//! │          └── assert_visible { locator }     (terminal)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every session is released exactly once, on every exit path; teardown
//! errors are swallowed so they can never mask a verdict.

pub mod error;
pub mod executor;
pub mod scenario;
pub mod script;
pub mod session;
pub mod stability;
pub mod target;
pub mod verdict;

pub use error::{RunnerError, RunnerResult};
pub use executor::{Runner, RunnerConfig};
pub use scenario::{Locator, Scenario, Step};
pub use verdict::{ScenarioReport, SuiteReport, Verdict};
