//! Error types for the scenario runner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("node not found. Install Node.js and run: npx playwright install")]
    NodeNotFound,

    #[error("browser session failed to launch: {0}")]
    SessionLaunch(String),

    #[error("scenario parse error: {0}")]
    ScenarioParse(String),

    #[error("scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("target application unreachable at {url} after {attempts} probes")]
    TargetUnreachable { url: String, attempts: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type RunnerResult<T> = Result<T, RunnerError>;
