//! Typed element locators compiled to Playwright locator expressions

use std::fmt;

use serde::{Deserialize, Serialize};

/// One link of a locator chain. Each segment is resolved inside the
/// element(s) matched by the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Segment {
    /// Raw CSS selector, e.g. `.always-visible`
    Css { selector: String },

    /// `data-testid` (or the configured test id attribute)
    TestId { id: String },

    /// ARIA role with optional accessible name
    Role {
        role: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        exact: bool,
    },

    /// Visible text
    Text {
        text: String,
        #[serde(default)]
        exact: bool,
    },

    /// Input placeholder
    Placeholder { text: String },

    /// Zero-based pick out of the current matches
    Nth { index: usize },
}

/// A chain of segments addressing one or more elements on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LocatorRepr", into = "Vec<Segment>")]
pub struct Locator {
    chain: Vec<Segment>,
}

/// YAML accepts either a single segment or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum LocatorRepr {
    One(Segment),
    Chain(Vec<Segment>),
}

impl From<LocatorRepr> for Locator {
    fn from(repr: LocatorRepr) -> Self {
        match repr {
            LocatorRepr::One(segment) => Self { chain: vec![segment] },
            LocatorRepr::Chain(chain) => Self { chain },
        }
    }
}

impl From<Locator> for Vec<Segment> {
    fn from(locator: Locator) -> Self {
        locator.chain
    }
}

impl Locator {
    fn from_segment(segment: Segment) -> Self {
        Self { chain: vec![segment] }
    }

    fn push(mut self, segment: Segment) -> Self {
        self.chain.push(segment);
        self
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_segment(Segment::Css { selector: selector.into() })
    }

    pub fn test_id(id: impl Into<String>) -> Self {
        Self::from_segment(Segment::TestId { id: id.into() })
    }

    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::from_segment(Segment::Role {
            role: role.into(),
            name: Some(name.into()),
            exact: false,
        })
    }

    /// Button matched by accessible name (case-insensitive substring)
    pub fn button(name: impl Into<String>) -> Self {
        Self::role("button", name)
    }

    /// Element containing `text` (case-insensitive substring)
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_segment(Segment::Text { text: text.into(), exact: false })
    }

    /// Element whose whole text equals `text`
    pub fn exact_text(text: impl Into<String>) -> Self {
        Self::from_segment(Segment::Text { text: text.into(), exact: true })
    }

    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::from_segment(Segment::Placeholder { text: text.into() })
    }

    pub fn nth(self, index: usize) -> Self {
        self.push(Segment::Nth { index })
    }

    pub fn and_role(self, role: impl Into<String>, name: impl Into<String>) -> Self {
        self.push(Segment::Role {
            role: role.into(),
            name: Some(name.into()),
            exact: false,
        })
    }

    pub fn and_button(self, name: impl Into<String>) -> Self {
        self.and_role("button", name)
    }

    pub fn and_text(self, text: impl Into<String>) -> Self {
        self.push(Segment::Text { text: text.into(), exact: false })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.chain
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Short label used in step names and reports
    pub fn describe(&self) -> String {
        if self.chain.is_empty() {
            return "page".to_string();
        }
        self.chain
            .iter()
            .map(|segment| match segment {
                Segment::Css { selector } => format!("css {:?}", selector),
                Segment::TestId { id } => format!("test-id {:?}", id),
                Segment::Role { role, name: Some(name), .. } => format!("{} {:?}", role, name),
                Segment::Role { role, name: None, .. } => role.clone(),
                Segment::Text { text, exact: true } => format!("text ={:?}", text),
                Segment::Text { text, exact: false } => format!("text {:?}", text),
                Segment::Placeholder { text } => format!("placeholder {:?}", text),
                Segment::Nth { index } => format!("nth {}", index),
            })
            .collect::<Vec<_>>()
            .join(" >> ")
    }

    /// Render as a Playwright locator expression rooted at `root`
    /// (normally `page`).
    pub fn to_js(&self, root: &str) -> String {
        let mut expr = root.to_string();
        for segment in &self.chain {
            match segment {
                Segment::Css { selector } => {
                    expr.push_str(&format!(".locator({})", js_str(selector)));
                }
                Segment::TestId { id } => {
                    expr.push_str(&format!(".getByTestId({})", js_str(id)));
                }
                Segment::Role { role, name: Some(name), exact } => {
                    expr.push_str(&format!(
                        ".getByRole({}, {{ name: {}, exact: {} }})",
                        js_str(role),
                        js_str(name),
                        exact
                    ));
                }
                Segment::Role { role, name: None, .. } => {
                    expr.push_str(&format!(".getByRole({})", js_str(role)));
                }
                Segment::Text { text, exact } => {
                    expr.push_str(&format!(".getByText({}, {{ exact: {} }})", js_str(text), exact));
                }
                Segment::Placeholder { text } => {
                    expr.push_str(&format!(".getByPlaceholder({})", js_str(text)));
                }
                Segment::Nth { index } => {
                    expr.push_str(&format!(".nth({})", index));
                }
            }
        }
        expr
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Quote a value as a JavaScript string literal.
pub(crate) fn js_str(value: &str) -> String {
    // A JSON string is a valid JS string literal.
    serde_json::Value::String(value.to_string()).to_string()
}
