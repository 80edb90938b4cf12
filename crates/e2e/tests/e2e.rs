//! E2E test harness entry point
//!
//! This file is the test binary that runs the blog app scenarios against a
//! live app. Run with:
//!
//! ```text
//! cargo test --package blogapp-e2e --test e2e -- --base-url http://localhost:5173
//! ```
//!
//! Without a base URL (flag or `BLOGAPP_E2E_BASE_URL`) the harness skips, so a
//! plain `cargo test` stays green on machines without a browser. Standard
//! test flags such as `--nocapture` or `--test-threads=1` are accepted.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use blogapp_e2e::cli::{Args, Selection};
use blogapp_e2e::runner::TestRunner;
use blogapp_e2e::E2eResult;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.libtest.list {
        return;
    }

    let Some(base_url) = args.base_url.clone() else {
        eprintln!("blogapp-e2e: no --base-url / BLOGAPP_E2E_BASE_URL given, skipping");
        return;
    };

    // Run async main
    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args, base_url));

    match result {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args, base_url: String) -> E2eResult<bool> {
    let mut runner = TestRunner::with_config(args.runner_config(&base_url));

    // Start (or wait for) the app
    runner.start_server().await?;

    let results = match args.selection() {
        Selection::Named(name) => runner.run_named(&name).await?,
        Selection::Tagged(tag) => runner.run_tagged(&tag).await?,
        Selection::All => runner.run_all().await?,
    };

    // Write results
    runner.write_results(&results)?;
    runner.stop_server().await?;

    Ok(results.failed == 0)
}
