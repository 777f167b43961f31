//! Scenario harness entry point
//!
//! This file is the test binary that runs UI scenarios from YAML files.
//! Run with: cargo test --package fleet-e2e --test e2e

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fleet_e2e::executor::{Runner, RunnerConfig};
use fleet_e2e::session::{Browser, BrowserConfig};
use fleet_e2e::stability::StabilityConfig;
use fleet_e2e::target::TargetConfig;
use fleet_e2e::RunnerResult;

#[derive(Parser, Debug)]
#[command(name = "fleet-e2e")]
#[command(about = "E2E scenario runner for the fleet management console")]
struct Args {
    /// Path to the scenario directory
    #[arg(short, long, default_value = "scenarios")]
    scenarios: PathBuf,

    /// Run only scenarios matching this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only a specific scenario by name
    #[arg(short, long)]
    name: Option<String>,

    /// Origin of the application under test
    #[arg(long, default_value = "http://localhost:3000")]
    base_url: String,

    /// Route probed before the run to confirm the app is up
    #[arg(long, default_value = "/fleet")]
    ready_path: String,

    /// Seconds to wait for the app to respond before giving up
    #[arg(long, default_value = "30")]
    ready_timeout_secs: u64,

    /// Skip the readiness probe entirely
    #[arg(long)]
    skip_ready_check: bool,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Run with a visible browser window
    #[arg(long)]
    headed: bool,

    /// Bound for each best-effort load-state wait, in milliseconds
    #[arg(long, default_value = "3000")]
    settle_timeout_ms: u64,

    /// Wall-clock deadline for one scenario, in seconds
    #[arg(long, default_value = "120")]
    deadline_secs: u64,

    /// Output directory for the JSON report
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> RunnerResult<bool> {
    let browser = match args.browser.as_str() {
        "firefox" => Browser::Firefox,
        "webkit" => Browser::Webkit,
        _ => Browser::Chromium,
    };

    let config = RunnerConfig {
        target: TargetConfig {
            base_url: args.base_url,
            ready_path: args.ready_path,
            ready_timeout: Duration::from_secs(args.ready_timeout_secs),
        },
        browser: BrowserConfig {
            browser,
            headless: !args.headed,
            ..BrowserConfig::default()
        },
        stability: StabilityConfig {
            settle_timeout_ms: args.settle_timeout_ms,
            scenario_deadline_ms: args.deadline_secs * 1_000,
            ..StabilityConfig::default()
        },
        scenarios_dir: args.scenarios,
        output_dir: args.output,
        skip_ready_check: args.skip_ready_check,
    };

    let runner = Runner::with_config(config);

    let report = if let Some(name) = args.name {
        let scenario_report = runner.run_named(&name).await?;
        fleet_e2e::SuiteReport {
            total: 1,
            passed: if scenario_report.verdict.is_pass() { 1 } else { 0 },
            failed: if scenario_report.verdict.is_pass() { 0 } else { 1 },
            duration_ms: scenario_report.duration_ms,
            reports: vec![scenario_report],
        }
    } else if let Some(tag) = args.tag {
        runner.run_tagged(&tag).await?
    } else {
        runner.run_all().await?
    };

    runner.write_report(&report)?;

    Ok(report.failed == 0)
}
