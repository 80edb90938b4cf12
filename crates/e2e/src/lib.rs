//! Blog app E2E Test Framework
//!
//! This crate provides a Rust-controlled E2E testing framework that:
//! - Waits for (or spawns) the blog app under test
//! - Resets the backend and seeds users over HTTP before every scenario
//! - Records each user journey on an explicit [`Page`] session object
//! - Compiles one scenario into one Playwright script and reads back per-step results
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── start_server() -> ServerHandle                       │
//! │    ├── prepare_backend()   POST /api/testing/reset          │
//! │    │                       POST /api/users                  │
//! │    ├── PlaywrightHandle::execute(steps) -> ScriptOutcome    │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (Rust builder or YAML)                            │
//! │    ├── name, description, tags, users                       │
//! │    └── steps: [Step]                                        │
//! │          ├── navigate { url }                               │
//! │          ├── click { target }                               │
//! │          ├── fill { target, value }                         │
//! │          ├── wait_for { target, state }                     │
//! │          ├── expect { target, visible?, contains_text? }    │
//! │          ├── accept_dialogs                                 │
//! │          └── screenshot { name } / log { message }          │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod cli;
pub mod error;
pub mod helpers;
pub mod locator;
pub mod page;
pub mod playwright;
pub mod runner;
pub mod scenario;
pub mod server;
pub mod suite;

pub use error::{E2eError, E2eResult};
pub use locator::Locator;
pub use page::{Page, Step, WaitState};
pub use runner::TestRunner;
pub use scenario::Scenario;
