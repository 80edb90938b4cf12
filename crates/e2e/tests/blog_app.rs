//! Live blog app scenarios
//!
//! Each test drives a real browser against a running app. They are ignored
//! by default; run them with
//!
//! ```text
//! BLOGAPP_E2E_BASE_URL=http://localhost:5173 cargo test -p blogapp-e2e --test blog_app -- --ignored --test-threads=1
//! ```
//!
//! `--test-threads=1` matters: every scenario resets the same backend.

use std::path::PathBuf;

use blogapp_e2e::playwright::PlaywrightConfig;
use blogapp_e2e::runner::{RunnerConfig, TestRunner};
use blogapp_e2e::server::ServerConfig;
use blogapp_e2e::{suite, Scenario};

fn runner() -> Option<TestRunner> {
    let Ok(base_url) = std::env::var("BLOGAPP_E2E_BASE_URL") else {
        eprintln!("Skipping: BLOGAPP_E2E_BASE_URL not set");
        return None;
    };
    let node_project = std::env::var("BLOGAPP_E2E_NODE_PROJECT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."));

    Some(TestRunner::with_config(RunnerConfig {
        server: ServerConfig {
            base_url: base_url.clone(),
            ..Default::default()
        },
        playwright: PlaywrightConfig {
            base_url,
            node_project_dir: node_project,
            ..Default::default()
        },
        ..Default::default()
    }))
}

async fn run(scenario: Scenario) {
    let Some(mut runner) = runner() else {
        return;
    };
    let result = runner.run_scenario(&scenario).await.expect("scenario setup");
    assert!(
        result.success,
        "{} failed: {}",
        result.name,
        result.error.as_deref().unwrap_or("unknown error")
    );
}

#[tokio::test]
#[ignore]
async fn login_form_is_shown() {
    run(suite::login_form_is_shown()).await;
}

#[tokio::test]
#[ignore]
async fn login_succeeds_with_correct_credentials() {
    run(suite::login_succeeds_with_correct_credentials()).await;
}

#[tokio::test]
#[ignore]
async fn login_fails_with_wrong_credentials() {
    run(suite::login_fails_with_wrong_credentials()).await;
}

#[tokio::test]
#[ignore]
async fn a_new_blog_can_be_created() {
    run(suite::a_new_blog_can_be_created()).await;
}

#[tokio::test]
#[ignore]
async fn a_blog_can_be_liked() {
    run(suite::a_blog_can_be_liked()).await;
}

#[tokio::test]
#[ignore]
async fn a_blog_can_be_deleted() {
    run(suite::a_blog_can_be_deleted()).await;
}

#[tokio::test]
#[ignore]
async fn only_the_creator_sees_the_remove_button() {
    run(suite::only_the_creator_sees_the_remove_button()).await;
}

#[tokio::test]
#[ignore]
async fn blogs_are_ordered_by_likes() {
    run(suite::blogs_are_ordered_by_likes()).await;
}
