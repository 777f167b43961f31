//! Step events and verdict evaluation.
//!
//! A scenario program reports progress as marked JSON lines on stdout.
//! This module decodes those lines and folds them into the scenario's
//! final verdict: Pass, or Fail with exactly one diagnostic. The first
//! failing assertion short-circuits everything after it.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::warn;

/// Outcome of one executed step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Ok,
    Skipped,
    Failed,
}

/// Why a step did not complete normally
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NavigationTimeout,
    ElementNotFound,
    LoadStateTimeout,
    Assertion,
}

/// One step's reported result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub index: usize,
    pub name: String,
    pub outcome: StepOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// An event line printed by a scenario program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Step(StepEvent),
    Done { ok: bool },
    Fatal { error: String },
}

fn event_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"^{}\s+(\{{.*\}})\s*$",
            regex::escape(crate::script::EVENT_MARKER)
        ))
        .expect("static regex")
    })
}

impl Event {
    /// Decode a stdout line; returns None for anything that is not a
    /// well-formed event line (browser noise, warnings, blank lines).
    pub fn parse_line(line: &str) -> Option<Event> {
        let captures = event_line_re().captures(line.trim_end())?;
        serde_json::from_str(captures.get(1)?.as_str()).ok()
    }
}

/// Final result of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail { diagnostic: String },
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail { diagnostic } => Some(diagnostic),
        }
    }
}

/// Fold a scenario's event stream into its verdict.
///
/// `on_fail` is the scenario's fixed diagnostic, surfaced when an
/// assertion step fails. Best-effort skips are logged and never fail the
/// scenario. A stream that ends without a `done` event means the session
/// died mid-scenario, which is a failure in its own right.
pub fn fold_events(on_fail: &str, events: &[Event]) -> Verdict {
    for event in events {
        match event {
            Event::Step(step) => match step.outcome {
                StepOutcome::Ok => {}
                StepOutcome::Skipped => {
                    warn!(
                        step = %step.name,
                        error = step.error.as_deref().unwrap_or(""),
                        "best-effort wait timed out, continuing"
                    );
                }
                StepOutcome::Failed => {
                    let diagnostic = match step.kind {
                        Some(FailureKind::Assertion) => on_fail.to_string(),
                        _ => format!(
                            "step `{}` failed: {}",
                            step.name,
                            step.error.as_deref().unwrap_or("unknown error")
                        ),
                    };
                    return Verdict::Fail { diagnostic };
                }
            },
            Event::Fatal { error } => {
                return Verdict::Fail {
                    diagnostic: format!("scenario aborted: {}", error),
                };
            }
            Event::Done { ok: true } => return Verdict::Pass,
            Event::Done { ok: false } => {
                // a failure event should have preceded this; be explicit
                return Verdict::Fail {
                    diagnostic: "scenario reported failure without a step event".to_string(),
                };
            }
        }
    }

    Verdict::Fail {
        diagnostic: "session ended before the scenario completed".to_string(),
    }
}

/// Result of one scenario run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub verdict: Verdict,
    pub duration_ms: u64,
    pub steps: Vec<StepEvent>,
}

/// Result of a whole suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub reports: Vec<ScenarioReport>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn step(index: usize, outcome: StepOutcome, kind: Option<FailureKind>) -> Event {
        Event::Step(StepEvent {
            index,
            name: format!("step-{}", index),
            outcome,
            kind,
            error: kind.map(|_| "boom".to_string()),
        })
    }

    #[test]
    fn parse_step_event_line() {
        let line = r#"@@EVT@@ {"event":"step","index":2,"name":"fill:label=Email","outcome":"ok"}"#;
        let event = Event::parse_line(line).unwrap();
        assert_eq!(
            event,
            Event::Step(StepEvent {
                index: 2,
                name: "fill:label=Email".to_string(),
                outcome: StepOutcome::Ok,
                kind: None,
                error: None,
            })
        );
    }

    #[test]
    fn parse_done_and_fatal_lines() {
        assert_eq!(
            Event::parse_line(r#"@@EVT@@ {"event":"done","ok":true}"#),
            Some(Event::Done { ok: true })
        );
        assert_eq!(
            Event::parse_line(r#"@@EVT@@ {"event":"fatal","error":"browser crashed"}"#),
            Some(Event::Fatal { error: "browser crashed".to_string() })
        );
    }

    #[test_case("random browser warning" ; "free-form output")]
    #[test_case("@@EVT@@ not json" ; "marker without payload")]
    #[test_case("" ; "blank line")]
    fn non_event_lines_ignored(line: &str) {
        assert_eq!(Event::parse_line(line), None);
    }

    #[test]
    fn clean_run_passes() {
        let events = vec![
            step(0, StepOutcome::Ok, None),
            step(1, StepOutcome::Ok, None),
            Event::Done { ok: true },
        ];
        assert_eq!(fold_events("diag", &events), Verdict::Pass);
    }

    #[test]
    fn best_effort_skip_never_fails_the_scenario() {
        let events = vec![
            step(0, StepOutcome::Ok, None),
            step(1, StepOutcome::Skipped, Some(FailureKind::LoadStateTimeout)),
            step(2, StepOutcome::Ok, None),
            Event::Done { ok: true },
        ];
        assert_eq!(fold_events("diag", &events), Verdict::Pass);
    }

    #[test]
    fn assertion_failure_surfaces_the_scenario_diagnostic() {
        let events = vec![
            step(0, StepOutcome::Ok, None),
            step(1, StepOutcome::Failed, Some(FailureKind::Assertion)),
            Event::Done { ok: false },
        ];
        let verdict = fold_events("expected dashboard access granted", &events);
        assert_eq!(
            verdict.diagnostic(),
            Some("expected dashboard access granted")
        );
    }

    #[test]
    fn first_failure_short_circuits() {
        let events = vec![
            step(0, StepOutcome::Failed, Some(FailureKind::Assertion)),
            step(1, StepOutcome::Failed, Some(FailureKind::ElementNotFound)),
        ];
        let verdict = fold_events("first diagnostic", &events);
        assert_eq!(verdict.diagnostic(), Some("first diagnostic"));
    }

    #[test_case(FailureKind::ElementNotFound ; "element not found")]
    #[test_case(FailureKind::NavigationTimeout ; "navigation timeout")]
    fn action_failure_carries_the_step_error(kind: FailureKind) {
        let events = vec![step(3, StepOutcome::Failed, Some(kind))];
        let verdict = fold_events("diag", &events);
        let diagnostic = verdict.diagnostic().unwrap();
        assert!(diagnostic.contains("step-3"));
        assert!(diagnostic.contains("boom"));
    }

    #[test]
    fn truncated_stream_fails() {
        let events = vec![step(0, StepOutcome::Ok, None)];
        let verdict = fold_events("diag", &events);
        assert!(!verdict.is_pass());
        assert_eq!(
            verdict.diagnostic(),
            Some("session ended before the scenario completed")
        );
    }

    #[test]
    fn fatal_event_fails_with_its_error() {
        let events = vec![Event::Fatal { error: "net::ERR_CONNECTION_REFUSED".to_string() }];
        let verdict = fold_events("diag", &events);
        assert_eq!(
            verdict.diagnostic(),
            Some("scenario aborted: net::ERR_CONNECTION_REFUSED")
        );
    }
}
