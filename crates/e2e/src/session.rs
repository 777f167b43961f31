//! Browser session lifecycle.
//!
//! One `Session` owns the `node` child process running one compiled
//! scenario program; the program itself owns the browser, context, and
//! page, and closes them in its `finally` block. Releasing a session is
//! idempotent, swallows every teardown error, and also happens on drop,
//! so a session is never leaked regardless of how a scenario exits.

use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, warn};

use crate::error::{RunnerError, RunnerResult};
use crate::verdict::Event;

#[derive(Debug, Clone, Copy, Default)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Browser launch configuration shared by every scenario in a run
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub browser: Browser,
    pub headless: bool,
    pub launch_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            // container-safe chromium flags
            launch_args: vec![
                "--disable-dev-shm-usage".to_string(),
                "--ipc=host".to_string(),
                "--single-process".to_string(),
            ],
        }
    }
}

/// Handle to one running scenario program
pub struct Session {
    child: Option<Child>,
    lines: Lines<BufReader<ChildStdout>>,
    _workdir: tempfile::TempDir,
}

impl Session {
    /// Write the program to a temp dir and spawn it under `node`
    pub async fn launch(program: &str) -> RunnerResult<Self> {
        check_node_installed()?;

        let workdir = tempfile::tempdir()?;
        let script_path = workdir.path().join("scenario.js");
        std::fs::write(&script_path, program)?;

        debug!(script = %script_path.display(), "launching scenario program");

        let mut command = Command::new("node");
        command
            .arg(&script_path)
            .current_dir(workdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        Self::spawn(command, workdir)
    }

    fn spawn(mut command: Command, workdir: tempfile::TempDir) -> RunnerResult<Self> {
        let mut child = command
            .spawn()
            .map_err(|e| RunnerError::SessionLaunch(e.to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::SessionLaunch("stdout pipe missing".to_string()))?;

        Ok(Self {
            child: Some(child),
            lines: BufReader::new(stdout).lines(),
            _workdir: workdir,
        })
    }

    /// Read the next event line, skipping any non-event output.
    /// Returns None once the child's stdout closes.
    pub async fn next_event(&mut self) -> Option<Event> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(event) = Event::parse_line(&line) {
                        return Some(event);
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    warn!("error reading session output: {}", e);
                    return None;
                }
            }
        }
    }

    /// Release the session: SIGTERM, a short grace period, then kill.
    /// Idempotent, and every teardown error is swallowed so it can never
    /// mask the scenario's verdict.
    pub async fn release(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };

        #[cfg(unix)]
        if let Some(pid) = child.id() {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
        }

        if tokio::time::timeout(Duration::from_millis(500), child.wait())
            .await
            .is_err()
        {
            let _ = child.kill().await;
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // backstop for paths that never reached release()
        if let Some(child) = self.child.as_mut() {
            let _ = child.start_kill();
        }
    }
}

fn check_node_installed() -> RunnerResult<()> {
    let status = std::process::Command::new("node")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => Ok(()),
        _ => Err(RunnerError::NodeNotFound),
    }
}
