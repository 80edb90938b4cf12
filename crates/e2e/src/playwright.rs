//! Playwright browser automation
//!
//! Every scenario is compiled into one Node script that owns one browser
//! context and one page, so the whole journey runs in a single session.
//! Each step reports back on stdout as a marker-prefixed JSON line which
//! [`parse_events`] turns into [`StepResult`]s.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::locator::js_str;
use crate::page::Step;

/// Prefix of every line the generated script reports through
pub const EVENT_MARKER: &str = "@@E2E ";

/// Playwright browser handle
pub struct PlaywrightHandle {
    config: PlaywrightConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
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

    /// Unknown names fall back to Chromium
    pub fn from_name(name: &str) -> Self {
        match name {
            "firefox" => Browser::Firefox,
            "webkit" => Browser::Webkit,
            _ => Browser::Chromium,
        }
    }
}

/// Result of executing a test step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub screenshot_path: Option<PathBuf>,
}

/// Everything one script run reported
#[derive(Debug, Clone, Default)]
pub struct ScriptOutcome {
    /// Results for the steps that ran, in order. Stops at the first failure.
    pub steps: Vec<StepResult>,

    /// Set when the script failed before any step ran (browser launch etc.)
    pub launch_error: Option<String>,

    /// Screenshot captured when a step failed
    pub failure_screenshot: Option<PathBuf>,

    /// The script reached its end
    pub completed: bool,
}

impl ScriptOutcome {
    pub fn success(&self) -> bool {
        self.completed && self.launch_error.is_none() && self.steps.iter().all(|s| s.success)
    }

    pub fn first_failure(&self) -> Option<&StepResult> {
        self.steps.iter().find(|s| !s.success)
    }
}

/// Raw output of a finished `node` process
#[derive(Debug, Clone)]
pub struct ScriptOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ScriptEvent {
    Step {
        index: i64,
        status: StepStatus,
        #[serde(default)]
        duration_ms: u64,
        #[serde(default)]
        error: Option<String>,
    },
    Screenshot {
        path: PathBuf,
    },
    Done,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum StepStatus {
    Passed,
    Failed,
}

impl PlaywrightHandle {
    /// Create a new Playwright handle
    pub fn new(mut config: PlaywrightConfig) -> E2eResult<Self> {
        // Verify playwright is installed
        Self::check_playwright_installed(&config.node_project_dir)?;

        // The script runs from the node project, so pin screenshots to an
        // absolute path first.
        std::fs::create_dir_all(&config.screenshot_dir)?;
        config.screenshot_dir = std::fs::canonicalize(&config.screenshot_dir)?;

        Ok(Self::with_config(config))
    }

    /// Create a handle without probing the local installation
    pub fn with_config(config: PlaywrightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    /// Check if Playwright is installed
    fn check_playwright_installed(project_dir: &Path) -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .current_dir(project_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    /// Compile, run and interpret one scenario's steps
    pub async fn execute(&self, scenario_name: &str, steps: &[Step]) -> E2eResult<ScriptOutcome> {
        let script = self.build_script(scenario_name, steps);
        let output = self.run_script(scenario_name, &script).await?;

        let outcome = parse_events(&output.stdout, steps, &self.config.screenshot_dir);
        if !output.success && outcome.first_failure().is_none() && outcome.launch_error.is_none() {
            return Err(E2eError::Playwright(format!(
                "Script failed:\nstdout: {}\nstderr: {}",
                output.stdout, output.stderr
            )));
        }
        Ok(outcome)
    }

    /// Build the Playwright script for a scenario
    pub fn build_script(&self, scenario_name: &str, steps: &[Step]) -> String {
        let config = &self.config;
        let failure_shot = config
            .screenshot_dir
            .join(format!("{}-failure.png", slug(scenario_name)));

        let mut script = String::new();

        // Header
        script.push_str(&format!(
            r#"
const {{ chromium, firefox, webkit, expect, selectors }} = require('@playwright/test');

const emit = (event) => console.log({marker} + JSON.stringify(event));

(async () => {{
  let current = -1;
  let acceptingDialogs = false;
  let browser;
  let page;
  const step = async (index, body) => {{
    current = index;
    const started = Date.now();
    await body();
    emit({{ event: 'step', index, status: 'passed', duration_ms: Date.now() - started }});
  }};

  try {{
    selectors.setTestIdAttribute({test_id});
    browser = await {browser}.launch({{ headless: {headless} }});
    const context = await browser.newContext({{
      baseURL: {base_url},
      viewport: {{ width: {width}, height: {height} }}
    }});
    page = await context.newPage();
    page.setDefaultTimeout({action_timeout});
    const assert = expect.configure({{ timeout: {expect_timeout} }});
"#,
            marker = js_str(EVENT_MARKER),
            test_id = js_str(&config.test_id_attribute),
            browser = config.browser.as_str(),
            headless = config.headless,
            base_url = js_str(&config.base_url),
            width = config.viewport_width,
            height = config.viewport_height,
            action_timeout = config.action_timeout_ms,
            expect_timeout = config.expect_timeout_ms,
        ));

        // Generate step code
        for (i, step) in steps.iter().enumerate() {
            script.push_str(&format!("\n    // Step {}: {}\n", i + 1, comment_text(&step.name())));
            script.push_str(&format!("    await step({}, async () => {{\n", i));
            script.push_str(&self.step_to_js(step));
            script.push_str("\n    });\n");
        }

        // Footer
        script.push_str(&format!(
            r#"
    emit({{ event: 'done' }});
  }} catch (error) {{
    const message = error && error.message ? error.message : String(error);
    emit({{ event: 'step', index: current, status: 'failed', error: message }});
    if (page) {{
      try {{
        await page.screenshot({{ path: {shot}, fullPage: true }});
        emit({{ event: 'screenshot', path: {shot} }});
      }} catch (_) {{}}
    }}
    process.exitCode = 1;
  }} finally {{
    if (browser) {{
      await browser.close();
    }}
  }}
}})();
"#,
            shot = js_str(&failure_shot.to_string_lossy()),
        ));

        script
    }

    /// Convert a step to JavaScript code
    fn step_to_js(&self, step: &Step) -> String {
        match step {
            Step::Navigate { url } => {
                format!("      await page.goto({});", js_str(url))
            }
            Step::Click { target } => {
                format!("      await {}.click();", target.to_js("page"))
            }
            Step::Fill { target, value } => {
                format!("      await {}.fill({});", target.to_js("page"), js_str(value))
            }
            Step::WaitFor { target, state } => {
                format!(
                    "      await {}.waitFor({{ state: '{}' }});",
                    target.to_js("page"),
                    state.as_str()
                )
            }
            Step::Expect { target, visible, contains_text, count } => {
                let locator = target.to_js("page");
                let mut assertions = Vec::new();

                match visible {
                    Some(true) => assertions.push(format!("      await assert({}).toBeVisible();", locator)),
                    Some(false) => assertions.push(format!("      await assert({}).toBeHidden();", locator)),
                    None => {}
                }

                if let Some(text) = contains_text {
                    assertions.push(format!(
                        "      await assert({}).toContainText({});",
                        locator,
                        js_str(text)
                    ));
                }

                if let Some(c) = count {
                    assertions.push(format!("      await assert({}).toHaveCount({});", locator, c));
                }

                // A bare expectation means "is visible".
                if assertions.is_empty() {
                    assertions.push(format!("      await assert({}).toBeVisible();", locator));
                }

                assertions.join("\n")
            }
            Step::AcceptDialogs => r#"      if (!acceptingDialogs) {
        acceptingDialogs = true;
        page.on('dialog', async (dialog) => {
          console.log('[dialog] ' + dialog.message());
          await dialog.accept();
        });
      }"#
            .to_string(),
            Step::Screenshot { name } => {
                let path = self.screenshot_path(name);
                format!(
                    "      await page.screenshot({{ path: {}, fullPage: true }});",
                    js_str(&path.to_string_lossy())
                )
            }
            Step::Log { message } => {
                format!("      console.log({});", js_str(&format!("[TEST] {}", message)))
            }
        }
    }

    fn screenshot_path(&self, name: &str) -> PathBuf {
        self.config.screenshot_dir.join(format!("{}.png", slug(name)))
    }

    /// Execute a generated script with node
    pub async fn run_script(&self, scenario_name: &str, script: &str) -> E2eResult<ScriptOutput> {
        // Write script to temp file
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("scenario.js");
        std::fs::write(&script_path, script)?;

        debug!("Running Playwright script: {}", script_path.display());

        let node_modules = self.config.node_project_dir.join("node_modules");
        let mut cmd = TokioCommand::new("node");
        cmd.arg(&script_path)
            .current_dir(&self.config.node_project_dir)
            .env("NODE_PATH", &node_modules)
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.config.script_timeout, cmd.output()).await {
            Ok(output) => output?,
            Err(_) => {
                warn!(
                    "Script for '{}' exceeded {:?}, killed",
                    scenario_name, self.config.script_timeout
                );
                return Err(E2eError::Timeout(format!("scenario '{}'", scenario_name)));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        for line in stdout.lines().filter(|l| !l.starts_with(EVENT_MARKER)) {
            info!("[{}] {}", scenario_name, line);
        }

        Ok(ScriptOutput {
            success: output.status.success(),
            stdout,
            stderr,
        })
    }
}

/// Interpret the event lines of a script's stdout.
///
/// `steps` must be the list the script was built from; indices in the events
/// refer to it.
pub fn parse_events(stdout: &str, steps: &[Step], screenshot_dir: &Path) -> ScriptOutcome {
    let mut outcome = ScriptOutcome::default();

    for line in stdout.lines() {
        let Some(payload) = line.strip_prefix(EVENT_MARKER) else {
            continue;
        };
        let event: ScriptEvent = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!("Ignoring malformed script event {:?}: {}", payload, e);
                continue;
            }
        };

        match event {
            ScriptEvent::Step { index, status, duration_ms, error } => {
                let step = usize::try_from(index).ok().and_then(|i| steps.get(i));
                let error = error.map(|e| strip_ansi(&e));
                match (step, status) {
                    (Some(step), status) => {
                        let screenshot_path = match step {
                            Step::Screenshot { name } if status == StepStatus::Passed => {
                                Some(screenshot_dir.join(format!("{}.png", slug(name))))
                            }
                            _ => None,
                        };
                        outcome.steps.push(StepResult {
                            success: status == StepStatus::Passed,
                            step_name: step.name(),
                            duration_ms,
                            error,
                            screenshot_path,
                        });
                    }
                    (None, StepStatus::Failed) => {
                        outcome.launch_error = Some(error.unwrap_or_else(|| "unknown error".to_string()));
                    }
                    (None, StepStatus::Passed) => {
                        warn!("Script reported unknown step index {}", index);
                    }
                }
            }
            ScriptEvent::Screenshot { path } => {
                outcome.failure_screenshot = Some(path);
            }
            ScriptEvent::Done => {
                outcome.completed = true;
            }
        }
    }

    outcome
}

/// Flatten text for a `//` comment. JS ends a line on any of these.
fn comment_text(text: &str) -> String {
    text.replace(['\n', '\r', '\u{2028}', '\u{2029}'], " ")
}

/// Remove terminal color codes that Playwright puts into assertion messages
pub fn strip_ansi(text: &str) -> String {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    let re = ANSI.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid ANSI pattern"));
    re.replace_all(text, "").to_string()
}

/// File-name-safe form of a scenario or screenshot name
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("scenario");
    }
    out
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub base_url: String,

    /// Directory whose `node_modules` contains `@playwright/test`
    pub node_project_dir: PathBuf,

    pub screenshot_dir: PathBuf,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub browser: Browser,
    pub headless: bool,

    /// Timeout for clicks, fills and explicit waits
    pub action_timeout_ms: u64,

    /// Retry window of auto-waiting assertions
    pub expect_timeout_ms: u64,

    pub test_id_attribute: String,

    /// Upper bound for one whole scenario script
    pub script_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            node_project_dir: PathBuf::from("."),
            screenshot_dir: PathBuf::from("test-results/screenshots"),
            viewport_width: 1280,
            viewport_height: 720,
            browser: Browser::Chromium,
            headless: true,
            action_timeout_ms: 5000,
            expect_timeout_ms: 5000,
            test_id_attribute: "data-testid".to_string(),
            script_timeout: Duration::from_secs(120),
        }
    }
}
