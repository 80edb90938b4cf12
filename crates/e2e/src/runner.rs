//! Main test runner that orchestrates the app, backend setup and Playwright

use std::path::PathBuf;
use std::time::{Duration, Instant};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::api::ApiClient;
use crate::error::{E2eError, E2eResult};
use crate::page::Step;
use crate::playwright::{PlaywrightConfig, PlaywrightHandle, StepResult};
use crate::scenario::Scenario;
use crate::server::{ServerConfig, ServerHandle};
use crate::suite::blog_app_suite;

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
    pub failure_screenshot: Option<PathBuf>,
}

impl TestResult {
    fn aborted(name: &str, error: &E2eError) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            duration_ms: 0,
            steps: vec![],
            error: Some(error.to_string()),
            failure_screenshot: None,
        }
    }
}

/// Result of running all scenarios
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
    pub results: Vec<TestResult>,
}

/// Main E2E test runner
pub struct TestRunner {
    /// App configuration
    server_config: ServerConfig,

    /// Playwright configuration
    playwright_config: PlaywrightConfig,

    /// Timeout for setup requests
    api_timeout: Duration,

    /// Running app handle (if any)
    server: Option<ServerHandle>,

    /// Extra YAML scenarios
    specs_dir: PathBuf,

    /// Output directory for results
    output_dir: PathBuf,
}

impl TestRunner {
    /// Create a new test runner with default configuration
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a test runner with custom configuration
    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            server_config: config.server,
            playwright_config: config.playwright,
            api_timeout: config.api_timeout,
            server: None,
            specs_dir: config.specs_dir,
            output_dir: config.output_dir,
        }
    }

    /// Start (or wait for) the app
    pub async fn start_server(&mut self) -> E2eResult<()> {
        if self.server.is_some() {
            return Ok(()); // Already running
        }

        let server = ServerHandle::spawn(self.server_config.clone()).await?;

        // The browser must hit the same origin that answered the health check
        self.playwright_config.base_url = server.base_url().to_string();

        self.server = Some(server);
        Ok(())
    }

    /// Stop the app if this runner started it
    pub async fn stop_server(&mut self) -> E2eResult<()> {
        if let Some(mut server) = self.server.take() {
            server.stop().await?;
        }
        Ok(())
    }

    /// Built-in suite followed by any YAML scenarios in the specs directory
    pub fn scenarios(&self) -> E2eResult<Vec<Scenario>> {
        let mut scenarios = blog_app_suite();
        if self.specs_dir.is_dir() {
            scenarios.extend(Scenario::load_all(&self.specs_dir)?);
        }
        Ok(scenarios)
    }

    /// Run every known scenario
    pub async fn run_all(&mut self) -> E2eResult<TestSuiteResult> {
        let scenarios = self.scenarios()?;
        self.run_scenarios(&scenarios).await
    }

    /// Run scenarios matching a tag
    pub async fn run_tagged(&mut self, tag: &str) -> E2eResult<TestSuiteResult> {
        let filtered: Vec<Scenario> = self
            .scenarios()?
            .into_iter()
            .filter(|s| s.has_tag(tag))
            .collect();
        self.run_scenarios(&filtered).await
    }

    /// Run scenarios whose name contains `pattern`
    pub async fn run_named(&mut self, pattern: &str) -> E2eResult<TestSuiteResult> {
        let filtered: Vec<Scenario> = self
            .scenarios()?
            .into_iter()
            .filter(|s| s.name.contains(pattern))
            .collect();
        if filtered.is_empty() {
            return Err(E2eError::SpecParse(format!("No scenario matches: {}", pattern)));
        }
        self.run_scenarios(&filtered).await
    }

    /// Run a list of scenarios, one after the other
    pub async fn run_scenarios(&mut self, scenarios: &[Scenario]) -> E2eResult<TestSuiteResult> {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;
        let skipped = 0;

        // Ensure the app is up
        self.start_server().await?;

        let playwright = PlaywrightHandle::new(self.playwright_config.clone())?;
        let api = ApiClient::new(&self.playwright_config.base_url, self.api_timeout)?;

        info!("Running {} scenario(s)...", scenarios.len());

        // Sequential on purpose: every scenario wipes the shared backend.
        for scenario in scenarios {
            let result = match run_one(&api, &playwright, scenario).await {
                Ok(result) => result,
                Err(e) => TestResult::aborted(&scenario.name, &e),
            };

            if result.success {
                passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                error!("✗ {} - {}", result.name, result.error.as_deref().unwrap_or("unknown error"));
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!("Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms);

        Ok(TestSuiteResult {
            total: scenarios.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            started_at,
            results,
        })
    }

    /// Run a single scenario
    pub async fn run_scenario(&mut self, scenario: &Scenario) -> E2eResult<TestResult> {
        self.start_server().await?;
        let playwright = PlaywrightHandle::new(self.playwright_config.clone())?;
        let api = ApiClient::new(&self.playwright_config.base_url, self.api_timeout)?;
        run_one(&api, &playwright, scenario).await
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Reset the backend and seed the scenario's users.
pub async fn prepare_backend(api: &ApiClient, scenario: &Scenario) -> E2eResult<()> {
    api.reset().await?;
    for user in &scenario.users {
        api.create_user(user).await?;
    }
    Ok(())
}

/// Steps actually sent to the browser: open the front page, then the journey.
pub fn session_steps(scenario: &Scenario) -> Vec<Step> {
    let mut steps = Vec::with_capacity(scenario.steps.len() + 1);
    steps.push(Step::Navigate { url: "/".to_string() });
    steps.extend(scenario.steps.iter().cloned());
    steps
}

async fn run_one(
    api: &ApiClient,
    playwright: &PlaywrightHandle,
    scenario: &Scenario,
) -> E2eResult<TestResult> {
    let start = Instant::now();
    debug!("Running scenario: {}", scenario.name);

    // Setup
    prepare_backend(api, scenario).await?;

    // Action sequence and assertions
    let steps = session_steps(scenario);
    let outcome = playwright.execute(&scenario.name, &steps).await?;

    let error = if let Some(failure) = outcome.first_failure() {
        Some(
            E2eError::StepFailed {
                step: failure.step_name.clone(),
                reason: failure.error.clone().unwrap_or_else(|| "unknown error".to_string()),
            }
            .to_string(),
        )
    } else if let Some(launch) = &outcome.launch_error {
        Some(E2eError::Playwright(launch.clone()).to_string())
    } else if !outcome.completed {
        Some("script ended before all steps ran".to_string())
    } else {
        None
    };

    Ok(TestResult {
        name: scenario.name.clone(),
        success: error.is_none(),
        duration_ms: start.elapsed().as_millis() as u64,
        steps: outcome.steps,
        error,
        failure_screenshot: outcome.failure_screenshot,
    })
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub server: ServerConfig,
    pub playwright: PlaywrightConfig,
    pub api_timeout: Duration,
    pub specs_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            playwright: PlaywrightConfig::default(),
            api_timeout: Duration::from_secs(10),
            specs_dir: PathBuf::from("specs"),
            output_dir: PathBuf::from("test-results"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::login_form_is_shown;

    #[test]
    fn test_session_opens_front_page_first() {
        let scenario = login_form_is_shown();
        let steps = session_steps(&scenario);
        assert_eq!(steps.len(), scenario.steps.len() + 1);
        assert_eq!(steps[0], Step::Navigate { url: "/".to_string() });
        assert_eq!(&steps[1..], scenario.steps.as_slice());
    }

    #[test]
    fn test_scenarios_include_yaml_specs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("extra.yaml"),
            "name: extra\ntags: [smoke]\nsteps: []\n",
        )
        .unwrap();

        let runner = TestRunner::with_config(RunnerConfig {
            specs_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        let scenarios = runner.scenarios().unwrap();
        assert_eq!(scenarios.len(), blog_app_suite().len() + 1);
        assert_eq!(scenarios.last().unwrap().name, "extra");
    }

    #[test]
    fn test_missing_specs_dir_means_builtin_only() {
        let runner = TestRunner::with_config(RunnerConfig {
            specs_dir: PathBuf::from("/nonexistent/blogapp-specs"),
            ..Default::default()
        });
        assert_eq!(runner.scenarios().unwrap().len(), blog_app_suite().len());
    }

    #[test]
    fn test_write_results() {
        let dir = tempfile::tempdir().unwrap();
        let runner = TestRunner::with_config(RunnerConfig {
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        });
        let results = TestSuiteResult {
            total: 1,
            passed: 0,
            failed: 1,
            skipped: 0,
            duration_ms: 12,
            started_at: Utc::now(),
            results: vec![TestResult::aborted(
                "Blog app › Login form is shown",
                &E2eError::Setup {
                    endpoint: "/api/testing/reset".to_string(),
                    status: 404,
                    body: "Not Found".to_string(),
                },
            )],
        };

        let path = runner.write_results(&results).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["failed"], 1);
        assert_eq!(
            written["results"][0]["error"],
            "Setup request /api/testing/reset failed with 404: Not Found"
        );
    }
}
