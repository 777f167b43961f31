//! Compiles a scenario into a standalone Playwright program.
//!
//! Each scenario becomes one self-contained JavaScript file run under
//! `node`: launch browser, open one context and one page, execute every
//! step in order, then tear the session down in a `finally` block. The
//! program reports progress by printing one marked JSON event line per
//! step; the Rust side never scrapes free-form output.
//!
//! Failure policy is compiled in: best-effort settles emit a `skipped`
//! event and continue, terminal steps emit a `failed` event and abort the
//! step sequence. Teardown always runs.

use crate::scenario::{Locator, Scenario, Step};
use crate::session::BrowserConfig;
use crate::stability::StabilityConfig;

/// Marker prefixed to every event line printed by a scenario program
pub const EVENT_MARKER: &str = "@@EVT@@";

/// Render a Rust string as a single-quoted JS string literal
fn js_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Compile a locator to the matching Playwright locator expression
fn locator_js(locator: &Locator) -> String {
    match locator {
        Locator::Role { role, name: Some(name) } => format!(
            "page.getByRole({}, {{ name: {} }})",
            js_str(role),
            js_str(name)
        ),
        Locator::Role { role, name: None } => format!("page.getByRole({})", js_str(role)),
        Locator::Label(label) => format!("page.getByLabel({})", js_str(label)),
        Locator::Placeholder(text) => format!("page.getByPlaceholder({})", js_str(text)),
        Locator::Text(text) => format!("page.getByText({})", js_str(text)),
        Locator::TestId(id) => format!("page.getByTestId({})", js_str(id)),
        Locator::Css(selector) => format!("page.locator({})", js_str(selector)),
    }
}

fn emit_ok(index: usize, name: &str) -> String {
    format!(
        "emit({{ event: 'step', index: {index}, name: {name}, outcome: 'ok' }});",
        name = js_str(name)
    )
}

fn emit_skipped(index: usize, name: &str, kind: &str) -> String {
    format!(
        "emit({{ event: 'step', index: {index}, name: {name}, outcome: 'skipped', kind: '{kind}', error: String((e && e.message) || e) }});",
        name = js_str(name)
    )
}

fn emit_failed(index: usize, name: &str, kind: &str) -> String {
    format!(
        "emit({{ event: 'step', index: {index}, name: {name}, outcome: 'failed', kind: '{kind}', error: String((e && e.message) || e) }});",
        name = js_str(name)
    )
}

/// The action statement(s) for one step, without event plumbing
fn step_action_js(step: &Step, base_url: &str, stability: &StabilityConfig) -> String {
    match step {
        Step::Navigate { url, timeout_ms } => format!(
            "await page.goto({}, {{ waitUntil: 'commit', timeout: {} }});",
            js_str(&format!("{}{}", base_url, url)),
            timeout_ms
        ),
        Step::WaitForLoad { timeout_ms } => {
            let state = js_str(stability.load_state.as_str());
            format!(
                "await page.waitForLoadState({state}, {{ timeout: {timeout_ms} }});\n      \
                 for (const frame of page.frames()) {{\n        \
                 try {{ await frame.waitForLoadState({state}, {{ timeout: {timeout_ms} }}); }} catch (err) {{}}\n      \
                 }}"
            )
        }
        Step::Fill { locator, value } => format!(
            "await {}.first().fill({});",
            locator_js(locator),
            js_str(value)
        ),
        Step::Click { locator, timeout_ms } => format!(
            "await {}.first().click({{ timeout: {} }});",
            locator_js(locator),
            timeout_ms
        ),
        Step::AssertVisible { locator, timeout_ms } => format!(
            "await {}.first().waitFor({{ state: 'visible', timeout: {} }});",
            locator_js(locator),
            timeout_ms
        ),
    }
}

/// The failure kind a terminal step reports when its action throws
fn failure_kind(step: &Step) -> &'static str {
    match step {
        Step::Navigate { .. } => "navigation_timeout",
        Step::WaitForLoad { .. } => "load_state_timeout",
        Step::Fill { .. } | Step::Click { .. } => "element_not_found",
        Step::AssertVisible { .. } => "assertion",
    }
}

/// One step block: action, event emission, and abort-on-failure
fn step_block(index: usize, step: &Step, base_url: &str, stability: &StabilityConfig) -> String {
    let name = step.label();
    let action = step_action_js(step, base_url, stability);
    if step.is_best_effort() {
        format!(
            "\n    // step {index}: {name}\n    \
             try {{\n      \
             {action}\n      \
             {ok}\n    \
             }} catch (e) {{\n      \
             {skipped}\n    \
             }}\n",
            ok = emit_ok(index, &name),
            skipped = emit_skipped(index, &name, failure_kind(step)),
        )
    } else {
        format!(
            "\n    // step {index}: {name}\n    \
             try {{\n      \
             {action}\n      \
             {ok}\n    \
             }} catch (e) {{\n      \
             {failed}\n      \
             throw abort;\n    \
             }}\n",
            ok = emit_ok(index, &name),
            failed = emit_failed(index, &name, failure_kind(step)),
        )
    }
}

/// Build the complete Playwright program for one scenario.
///
/// The opening navigation to `base_url + scenario.entry` is compiled as
/// step 0; the scenario's own steps follow from index 1.
pub fn build_program(
    scenario: &Scenario,
    browser: &BrowserConfig,
    stability: &StabilityConfig,
    base_url: &str,
) -> String {
    let mut program = String::new();

    let args = browser
        .launch_args
        .iter()
        .map(|a| js_str(a))
        .collect::<Vec<_>>()
        .join(", ");

    program.push_str(&format!(
        "const {{ chromium, firefox, webkit }} = require('playwright');\n\
         \n\
         const emit = (payload) => console.log('{marker} ' + JSON.stringify(payload));\n\
         const abort = Symbol('abort');\n\
         \n\
         (async () => {{\n  \
         const browser = await {browser_kind}.launch({{ headless: {headless}, args: [{args}] }});\n  \
         const context = await browser.newContext({{ viewport: {{ width: {width}, height: {height} }} }});\n  \
         context.setDefaultTimeout({action_timeout});\n  \
         const page = await context.newPage();\n  \
         let failed = false;\n  \
         try {{\n",
        marker = EVENT_MARKER,
        browser_kind = browser.browser.as_str(),
        headless = browser.headless,
        width = scenario.viewport.width,
        height = scenario.viewport.height,
        action_timeout = stability.action_timeout_ms,
    ));

    let entry = Step::Navigate {
        url: scenario.entry.clone(),
        timeout_ms: 10_000,
    };
    program.push_str(&step_block(0, &entry, base_url, stability));

    for (i, step) in scenario.steps.iter().enumerate() {
        program.push_str(&step_block(i + 1, step, base_url, stability));
    }

    program.push_str(
        "  } catch (e) {\n    \
         if (e !== abort) emit({ event: 'fatal', error: String((e && e.message) || e) });\n    \
         failed = true;\n  \
         } finally {\n    \
         emit({ event: 'done', ok: !failed });\n    \
         try { await context.close(); } catch (e) {}\n    \
         try { await browser.close(); } catch (e) {}\n  \
         }\n\
         })();\n",
    );

    program
}
