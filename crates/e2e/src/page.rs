//! Browser session recorder
//!
//! A [`Page`] is the explicit session object threaded through helpers and
//! scenario bodies. It records [`Step`]s in order; the Playwright driver later
//! replays all of them against a single browser page, so login state and
//! dialog handlers carry over from one step to the next.

use serde::{Deserialize, Serialize};

use crate::locator::Locator;

/// A single step in a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a URL (relative to base)
    Navigate { url: String },

    /// Click an element
    Click { target: Locator },

    /// Fill an input field
    Fill { target: Locator, value: String },

    /// Wait for an element to reach a state
    WaitFor {
        target: Locator,
        #[serde(default)]
        state: WaitState,
    },

    /// Auto-retrying assertion about an element
    Expect {
        target: Locator,
        #[serde(default)]
        visible: Option<bool>,
        #[serde(default)]
        contains_text: Option<String>,
        #[serde(default)]
        count: Option<usize>,
    },

    /// Accept every dialog (alert, confirm, prompt) raised from here on
    AcceptDialogs,

    /// Take a screenshot
    Screenshot { name: String },

    /// Log a message (for debugging)
    Log { message: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

impl Step {
    /// Stable label used in logs and reports
    pub fn name(&self) -> String {
        match self {
            Step::Navigate { url } => format!("navigate:{}", url),
            Step::Click { target } => format!("click:{}", target),
            Step::Fill { target, .. } => format!("fill:{}", target),
            Step::WaitFor { target, state } => format!("wait_for:{}:{}", target, state.as_str()),
            Step::Expect { target, .. } => format!("expect:{}", target),
            Step::AcceptDialogs => "accept_dialogs".to_string(),
            Step::Screenshot { name } => format!("screenshot:{}", name),
            Step::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }

    /// Locator this step acts on, if any
    pub fn target(&self) -> Option<&Locator> {
        match self {
            Step::Click { target }
            | Step::Fill { target, .. }
            | Step::WaitFor { target, .. }
            | Step::Expect { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// Ordered record of one session's interactions
#[derive(Debug, Clone, Default)]
pub struct Page {
    steps: Vec<Step>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn goto(&mut self, url: impl Into<String>) -> &mut Self {
        self.record(Step::Navigate { url: url.into() })
    }

    pub fn click(&mut self, target: Locator) -> &mut Self {
        self.record(Step::Click { target })
    }

    pub fn fill(&mut self, target: Locator, value: impl Into<String>) -> &mut Self {
        self.record(Step::Fill {
            target,
            value: value.into(),
        })
    }

    pub fn wait_for(&mut self, target: Locator, state: WaitState) -> &mut Self {
        self.record(Step::WaitFor { target, state })
    }

    pub fn expect_visible(&mut self, target: Locator) -> &mut Self {
        self.record(Step::Expect {
            target,
            visible: Some(true),
            contains_text: None,
            count: None,
        })
    }

    /// Passes when the element is hidden or absent
    pub fn expect_hidden(&mut self, target: Locator) -> &mut Self {
        self.record(Step::Expect {
            target,
            visible: Some(false),
            contains_text: None,
            count: None,
        })
    }

    pub fn expect_text(&mut self, target: Locator, text: impl Into<String>) -> &mut Self {
        self.record(Step::Expect {
            target,
            visible: None,
            contains_text: Some(text.into()),
            count: None,
        })
    }

    pub fn expect_count(&mut self, target: Locator, count: usize) -> &mut Self {
        self.record(Step::Expect {
            target,
            visible: None,
            contains_text: None,
            count: Some(count),
        })
    }

    pub fn accept_dialogs(&mut self) -> &mut Self {
        self.record(Step::AcceptDialogs)
    }

    pub fn screenshot(&mut self, name: impl Into<String>) -> &mut Self {
        self.record(Step::Screenshot { name: name.into() })
    }

    pub fn log(&mut self, message: impl Into<String>) -> &mut Self {
        self.record(Step::Log {
            message: message.into(),
        })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    fn record(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_call_order() {
        let mut page = Page::new();
        page.goto("/")
            .click(Locator::button("Login"))
            .fill(Locator::test_id("username"), "admin")
            .expect_visible(Locator::text("logged in"));

        let names: Vec<String> = page.steps().iter().map(Step::name).collect();
        assert_eq!(
            names,
            vec![
                "navigate:/",
                r#"click:button "Login""#,
                r#"fill:test-id "username""#,
                r#"expect:text "logged in""#,
            ]
        );
    }

    #[test]
    fn test_parse_step_yaml() {
        let step: Step = serde_yaml::from_str(
            r#"
action: expect
target: { by: text, text: invalid username or password }
visible: true
"#,
        )
        .unwrap();
        assert_eq!(
            step,
            Step::Expect {
                target: Locator::text("invalid username or password"),
                visible: Some(true),
                contains_text: None,
                count: None,
            }
        );

        let step: Step = serde_yaml::from_str("action: accept_dialogs").unwrap();
        assert_eq!(step, Step::AcceptDialogs);
    }

    #[test]
    fn test_wait_state_defaults_to_visible() {
        let step: Step = serde_yaml::from_str(
            r#"
action: wait_for
target: { by: role, role: button, name: Log out }
"#,
        )
        .unwrap();
        assert_eq!(step.name(), r#"wait_for:button "Log out":visible"#);
    }
}
