//! Element targets
//!
//! A target locates elements in a document. Targets are strict wherever an
//! interaction needs exactly one element: zero matches and multiple matches
//! are distinct failures, so a scenario never silently clicks the wrong
//! control.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A declarative element locator
///
/// In scenario files a target is either a bare CSS selector string, a
/// `{role, name}` pair resolved through accessible names, or a
/// `{selector, text}` pair that filters CSS matches by their visible text
/// (optionally descending into a `find` sub-selector afterwards).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    /// Accessible-role lookup, e.g. `{role: link, name: "Next question"}`
    Role {
        /// Role to match: `link`, `button`, or `heading`
        role: String,
        /// Accessible name (link/button text, heading text)
        name: String,
    },
    /// CSS matches filtered by contained text, e.g. a list item holding a
    /// generated fixture name; `find` then selects within the match
    Text {
        /// CSS selector for the candidate elements
        selector: String,
        /// Text the element must contain (whitespace-normalized)
        text: String,
        /// Optional CSS selector applied inside the filtered element
        #[serde(default, skip_serializing_if = "Option::is_none")]
        find: Option<String>,
    },
    /// Plain CSS selector
    Css(String),
}

impl Target {
    /// Shorthand for a CSS target
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Shorthand for a role target
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    /// Return a copy with `{unique}` placeholders replaced in text filters
    /// and accessible names. CSS selector strings are left untouched.
    pub fn substitute(&self, id: &str) -> Self {
        match self {
            Self::Css(s) => Self::Css(s.clone()),
            Self::Role { role, name } => Self::Role {
                role: role.clone(),
                name: crate::scenario::ids::substitute(name, id),
            },
            Self::Text {
                selector,
                text,
                find,
            } => Self::Text {
                selector: selector.clone(),
                text: crate::scenario::ids::substitute(text, id),
                find: find.clone(),
            },
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "'{s}'"),
            Self::Role { role, name } => write!(f, "{role} \"{name}\""),
            Self::Text {
                selector,
                text,
                find: None,
            } => write!(f, "'{selector}' containing \"{text}\""),
            Self::Text {
                selector,
                text,
                find: Some(inner),
            } => write!(f, "'{inner}' within '{selector}' containing \"{text}\""),
        }
    }
}
