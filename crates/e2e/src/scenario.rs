//! Declarative YAML scenario definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::{RunnerError, RunnerResult};

/// One end-to-end UI test case parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Route appended to the target base URL for the opening navigation
    #[serde(default)]
    pub entry: String,

    /// Viewport size for the browser
    #[serde(default = "default_viewport")]
    pub viewport: Viewport,

    /// Steps to execute in order
    pub steps: Vec<Step>,

    /// Diagnostic surfaced verbatim when an assertion in this scenario fails
    pub on_fail: String,
}

fn default_viewport() -> Viewport {
    Viewport { width: 1280, height: 720 }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// A single step in a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a URL (relative to the target base URL)
    Navigate {
        url: String,
        #[serde(default = "default_navigate_timeout")]
        timeout_ms: u64,
    },

    /// Best-effort settle of the page and every nested frame.
    /// A timeout here never fails the scenario.
    WaitForLoad {
        #[serde(default = "default_settle_timeout")]
        timeout_ms: u64,
    },

    /// Fill an input field
    Fill {
        locator: Locator,
        value: String,
    },

    /// Click an element
    Click {
        locator: Locator,
        #[serde(default = "default_action_timeout")]
        timeout_ms: u64,
    },

    /// Assert that an element becomes visible before the deadline.
    /// Failure is terminal and produces the scenario's `on_fail` diagnostic.
    AssertVisible {
        locator: Locator,
        #[serde(default = "default_assert_timeout")]
        timeout_ms: u64,
    },
}

fn default_navigate_timeout() -> u64 {
    10_000
}

fn default_settle_timeout() -> u64 {
    3_000
}

fn default_action_timeout() -> u64 {
    5_000
}

fn default_assert_timeout() -> u64 {
    30_000
}

impl Step {
    /// Short label used in step events and logs
    pub fn label(&self) -> String {
        match self {
            Step::Navigate { url, .. } => format!("navigate:{}", url),
            Step::WaitForLoad { .. } => "wait_for_load".to_string(),
            Step::Fill { locator, .. } => format!("fill:{}", locator),
            Step::Click { locator, .. } => format!("click:{}", locator),
            Step::AssertVisible { locator, .. } => format!("assert_visible:{}", locator),
        }
    }

    /// Whether a failure of this step is recoverable (logged and skipped)
    pub fn is_best_effort(&self) -> bool {
        matches!(self, Step::WaitForLoad { .. })
    }
}

/// Semantic element selector.
///
/// Scenarios locate elements by role, label, or visible text rather than by
/// DOM position, so they survive layout changes. `Css` is the escape hatch
/// for elements with no accessible handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    /// ARIA role, optionally narrowed by accessible name
    Role {
        role: String,
        #[serde(default)]
        name: Option<String>,
    },
    /// Form control by associated label text
    Label(String),
    /// Input by placeholder text
    Placeholder(String),
    /// Element by visible text
    Text(String),
    /// Element by `data-testid` attribute
    TestId(String),
    /// Raw CSS selector
    Css(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Role { role, name: Some(name) } => write!(f, "role={}[name={}]", role, name),
            Locator::Role { role, name: None } => write!(f, "role={}", role),
            Locator::Label(label) => write!(f, "label={}", label),
            Locator::Placeholder(p) => write!(f, "placeholder={}", p),
            Locator::Text(text) => write!(f, "text={}", text),
            Locator::TestId(id) => write!(f, "testid={}", id),
            Locator::Css(sel) => write!(f, "css={}", sel),
        }
    }
}

impl Scenario {
    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> RunnerResult<Self> {
        serde_yaml::from_str(yaml).map_err(RunnerError::from)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> RunnerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| {
            RunnerError::ScenarioParse(format!("{}: {}", path.display(), e))
        })
    }

    /// Load all scenarios from a directory, in file-name order
    pub fn load_all(dir: &Path) -> RunnerResult<Vec<Self>> {
        let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        let mut scenarios = Vec::with_capacity(paths.len());
        for path in paths {
            scenarios.push(Self::from_file(&path)?);
        }
        Ok(scenarios)
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(scenarios: &'a [Self], tag: &str) -> Vec<&'a Self> {
        scenarios
            .iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }
}
