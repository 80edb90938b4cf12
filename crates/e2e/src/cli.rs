//! Command line of the `e2e` harness binary
//!
//! The binary is a `harness = false` test target, so `cargo test` hands it
//! the standard test flags as well as our own. Those are accepted and ignored.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::playwright::{Browser, PlaywrightConfig};
use crate::runner::RunnerConfig;
use crate::server::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "blogapp-e2e")]
#[command(about = "E2E test runner for the blog app")]
pub struct Args {
    /// Only run scenarios whose name contains this text
    pub filter: Option<String>,

    /// Base URL of the running app (UI and API)
    #[arg(long, env = "BLOGAPP_E2E_BASE_URL")]
    pub base_url: Option<String>,

    /// Command that starts the app, e.g. "npm run start:test"
    #[arg(long, env = "BLOGAPP_E2E_APP_COMMAND")]
    pub app_command: Option<String>,

    /// Working directory for the app command
    #[arg(long, env = "BLOGAPP_E2E_APP_DIR")]
    pub app_dir: Option<PathBuf>,

    /// Path polled until the app answers
    #[arg(long, env = "BLOGAPP_E2E_HEALTH_PATH", default_value = "/")]
    pub health_path: String,

    /// Seconds to wait for the app to come up
    #[arg(long, env = "BLOGAPP_E2E_STARTUP_TIMEOUT", default_value = "30")]
    pub startup_timeout: u64,

    /// Directory whose node_modules contains @playwright/test
    #[arg(long, env = "BLOGAPP_E2E_NODE_PROJECT", default_value = ".")]
    pub node_project: PathBuf,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, env = "BLOGAPP_E2E_BROWSER", default_value = "chromium")]
    pub browser: String,

    /// Show the browser window
    #[arg(long, env = "BLOGAPP_E2E_HEADED")]
    pub headed: bool,

    /// Viewport width
    #[arg(long, env = "BLOGAPP_E2E_VIEWPORT_WIDTH", default_value = "1280")]
    pub viewport_width: u32,

    /// Viewport height
    #[arg(long, env = "BLOGAPP_E2E_VIEWPORT_HEIGHT", default_value = "720")]
    pub viewport_height: u32,

    /// Timeout for clicks, fills and waits (ms)
    #[arg(long, env = "BLOGAPP_E2E_ACTION_TIMEOUT", default_value = "5000")]
    pub action_timeout: u64,

    /// Retry window for assertions (ms)
    #[arg(long, env = "BLOGAPP_E2E_EXPECT_TIMEOUT", default_value = "5000")]
    pub expect_timeout: u64,

    /// Attribute used by test id locators
    #[arg(long, env = "BLOGAPP_E2E_TEST_ID_ATTRIBUTE", default_value = "data-testid")]
    pub test_id_attribute: String,

    /// Directory with extra YAML scenarios
    #[arg(short, long, env = "BLOGAPP_E2E_SPECS", default_value = "specs")]
    pub specs: PathBuf,

    /// Run only scenarios with this tag
    #[arg(short, long, env = "BLOGAPP_E2E_TAG")]
    pub tag: Option<String>,

    /// Run only scenarios whose name contains this text
    #[arg(short, long, env = "BLOGAPP_E2E_NAME")]
    pub name: Option<String>,

    /// Output directory for results
    #[arg(short, long, env = "BLOGAPP_E2E_OUTPUT", default_value = "test-results")]
    pub output: PathBuf,

    #[command(flatten)]
    pub libtest: LibtestFlags,
}

/// Flags `cargo test` may forward to every test binary
#[derive(clap::Args, Debug, Default)]
pub struct LibtestFlags {
    #[arg(short, long, hide = true)]
    pub quiet: bool,

    #[arg(long, hide = true)]
    pub nocapture: bool,

    #[arg(long, hide = true)]
    pub show_output: bool,

    #[arg(long, hide = true)]
    pub test_threads: Option<String>,

    #[arg(long, hide = true)]
    pub ignored: bool,

    #[arg(long, hide = true)]
    pub include_ignored: bool,

    #[arg(long, hide = true)]
    pub exact: bool,

    #[arg(long, hide = true)]
    pub format: Option<String>,

    #[arg(long, hide = true)]
    pub color: Option<String>,

    #[arg(long, hide = true)]
    pub skip: Vec<String>,

    /// `cargo test -- --list`: there are no libtest tests to list
    #[arg(long, hide = true)]
    pub list: bool,
}

/// Which scenarios a run selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Named(String),
    Tagged(String),
}

impl Args {
    /// `--name` wins over the positional filter, and either wins over `--tag`
    pub fn selection(&self) -> Selection {
        if let Some(name) = self.name.clone().or_else(|| self.filter.clone()) {
            Selection::Named(name)
        } else if let Some(tag) = self.tag.clone() {
            Selection::Tagged(tag)
        } else {
            Selection::All
        }
    }

    pub fn runner_config(&self, base_url: &str) -> RunnerConfig {
        let command = self
            .app_command
            .as_deref()
            .map(|c| c.split_whitespace().map(String::from).collect::<Vec<_>>());

        RunnerConfig {
            server: ServerConfig {
                base_url: base_url.to_string(),
                command,
                working_dir: self.app_dir.clone(),
                health_path: self.health_path.clone(),
                startup_timeout: Duration::from_secs(self.startup_timeout),
            },
            playwright: PlaywrightConfig {
                base_url: base_url.to_string(),
                node_project_dir: self.node_project.clone(),
                screenshot_dir: self.output.join("screenshots"),
                viewport_width: self.viewport_width,
                viewport_height: self.viewport_height,
                browser: Browser::from_name(&self.browser),
                headless: !self.headed,
                action_timeout_ms: self.action_timeout,
                expect_timeout_ms: self.expect_timeout,
                test_id_attribute: self.test_id_attribute.clone(),
                ..Default::default()
            },
            specs_dir: self.specs.clone(),
            output_dir: self.output.clone(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use test_case::test_case;

    #[test_case(&["e2e", "--nocapture"])]
    #[test_case(&["e2e", "--test-threads=1"])]
    #[test_case(&["e2e", "--test-threads", "1", "--nocapture", "-q"])]
    #[test_case(&["e2e", "--ignored", "--exact", "--color", "never"])]
    #[test_case(&["e2e", "--include-ignored", "--format=terse", "--show-output"])]
    #[test_case(&["e2e", "--skip", "slow", "--skip", "flaky", "--list"])]
    fn test_accepts_cargo_test_flags(argv: &[&str]) {
        let args = Args::try_parse_from(argv.iter().copied()).unwrap();
        assert_eq!(args.filter, None);
    }

    #[test]
    fn test_cargo_test_filter_is_the_positional() {
        let args = Args::try_parse_from(["e2e", "--nocapture", "deleted"]).unwrap();
        assert_eq!(args.selection(), Selection::Named("deleted".to_string()));
        assert!(args.libtest.nocapture);
    }

    #[test]
    fn test_libtest_flags_stay_out_of_help() {
        let mut command = Args::command();
        let help = command.render_long_help().to_string();
        assert!(!help.contains("nocapture"));
        assert!(!help.contains("test-threads"));
    }

    #[test]
    fn test_every_option_has_an_env_var() {
        let command = Args::command();
        for arg in command.get_arguments() {
            if arg.is_positional() || arg.is_hide_set() || arg.get_id() == "help" {
                continue;
            }
            let Some(env) = arg.get_env() else {
                panic!("--{} has no env var", arg.get_id());
            };
            let env = env.to_string_lossy();
            assert!(env.starts_with("BLOGAPP_E2E_"), "{env}");
        }
    }

    #[test]
    fn test_env_vars_fill_in_options() {
        std::env::set_var("BLOGAPP_E2E_VIEWPORT_WIDTH", "800");
        std::env::set_var("BLOGAPP_E2E_TEST_ID_ATTRIBUTE", "data-qa");
        std::env::set_var("BLOGAPP_E2E_OUTPUT", "/tmp/e2e-out");

        let args = Args::try_parse_from(["e2e"]).unwrap();
        let config = args.runner_config("http://localhost:3003");

        std::env::remove_var("BLOGAPP_E2E_VIEWPORT_WIDTH");
        std::env::remove_var("BLOGAPP_E2E_TEST_ID_ATTRIBUTE");
        std::env::remove_var("BLOGAPP_E2E_OUTPUT");

        assert_eq!(config.playwright.viewport_width, 800);
        assert_eq!(config.playwright.test_id_attribute, "data-qa");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/e2e-out"));
        assert_eq!(
            config.playwright.screenshot_dir,
            PathBuf::from("/tmp/e2e-out/screenshots")
        );
    }

    #[test_case(&["e2e"], Selection::All)]
    #[test_case(&["e2e", "--tag", "login"], Selection::Tagged("login".into()))]
    #[test_case(&["e2e", "-t", "login", "-n", "liked"], Selection::Named("liked".into()))]
    fn test_selection(argv: &[&str], expected: Selection) {
        let args = Args::try_parse_from(argv.iter().copied()).unwrap();
        assert_eq!(args.selection(), expected);
    }
}
