//! Assertion engine
//!
//! Declarative expectations over the current document, evaluated with
//! bounded polling: a mismatch is retried against a re-fetched snapshot
//! until it passes or the ceiling elapses. Absence is a valid pass for
//! `not-visible` and `count == 0`; an invalid selector is an error, never
//! a mismatch.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

use crate::browser::Navigator;
use crate::common::{Error, Result};
use crate::dom::{Document, Target};

/// Bounds for assertion polling
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total time a single expectation may keep retrying
    pub ceiling: Duration,
    /// Pause between polls
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            ceiling: Duration::from_secs(5),
            interval: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// Same interval, different ceiling
    pub fn with_ceiling(self, ceiling: Duration) -> Self {
        Self { ceiling, ..self }
    }
}

/// A declarative expectation about the current document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Exactly one element whose normalized text equals the value
    TextEquals(String),
    /// Exactly one element whose normalized text contains the value
    TextContains(String),
    /// The number of matching elements equals the value
    CountEquals(usize),
    /// At least one matching element is visible
    Visible,
    /// No matching element is visible (absence passes)
    NotVisible,
    /// The current URL (path for `/...` values) equals the value
    UrlEquals(String),
}

impl Matcher {
    fn expected(&self) -> String {
        match self {
            Self::TextEquals(t) => format!("text == \"{t}\""),
            Self::TextContains(t) => format!("text contains \"{t}\""),
            Self::CountEquals(n) => format!("count == {n}"),
            Self::Visible => "visible".to_string(),
            Self::NotVisible => "not visible".to_string(),
            Self::UrlEquals(u) => format!("url == {u}"),
        }
    }
}

/// A recorded mismatch between expected and actual document state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionFailure {
    /// Scenario name, filled in by the runner
    pub scenario: String,
    /// Zero-based step index, filled in by the runner
    pub step: usize,
    /// The target the expectation was evaluated against
    pub target: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.target, self.expected, self.actual
        )
    }
}

/// Evaluate one expectation against the navigator's current document,
/// retrying per the policy by re-fetching the current location.
pub async fn expect(
    nav: &mut Navigator,
    target: Option<&Target>,
    matcher: &Matcher,
    policy: &RetryPolicy,
) -> Result<()> {
    let deadline = Instant::now() + policy.ceiling;
    let mut last;
    loop {
        match evaluate(nav.document()?, target, matcher)? {
            None => return Ok(()),
            Some(mismatch) => last = mismatch,
        }
        if Instant::now() >= deadline {
            break;
        }
        trace!(matcher = ?matcher, "expectation not met yet, polling");
        tokio::time::sleep(policy.interval).await;
        nav.refresh().await?;
    }

    Err(Error::Assertion(AssertionFailure {
        scenario: String::new(),
        step: 0,
        target: target
            .map(ToString::to_string)
            .unwrap_or_else(|| "page".to_string()),
        expected: last.0,
        actual: last.1,
    }))
}

/// One evaluation: `Ok(None)` is a pass, `Ok(Some((expected, actual)))` a
/// retryable mismatch, `Err` a hard error (invalid selector, no document).
fn evaluate(
    doc: &Document,
    target: Option<&Target>,
    matcher: &Matcher,
) -> Result<Option<(String, String)>> {
    if let Matcher::UrlEquals(expected) = matcher {
        let actual = if expected.starts_with('/') {
            doc.url().path().to_string()
        } else {
            doc.url().as_str().to_string()
        };
        return Ok(if actual == *expected {
            None
        } else {
            Some((matcher.expected(), actual))
        });
    }

    let target = target.ok_or_else(|| {
        Error::ScenarioParse(format!("matcher {} requires a target", matcher.expected()))
    })?;
    let hits = doc.query(target)?;

    let mismatch = match matcher {
        Matcher::TextEquals(text) => match hits.as_slice() {
            [] => Some("not found".to_string()),
            [one] if one.text == *text => None,
            [one] => Some(format!("\"{}\"", one.text)),
            many => Some(format!("{} elements matched", many.len())),
        },
        Matcher::TextContains(text) => match hits.as_slice() {
            [] => Some("not found".to_string()),
            [one] if one.text.contains(text.as_str()) => None,
            [one] => Some(format!("\"{}\"", one.text)),
            many => Some(format!("{} elements matched", many.len())),
        },
        Matcher::CountEquals(expected) => {
            if hits.len() == *expected {
                None
            } else {
                Some(format!("count == {}", hits.len()))
            }
        }
        Matcher::Visible => {
            if hits.iter().any(|h| h.visible) {
                None
            } else if hits.is_empty() {
                Some("not found".to_string())
            } else {
                Some("matched but hidden".to_string())
            }
        }
        Matcher::NotVisible => {
            if hits.iter().any(|h| h.visible) {
                Some("visible".to_string())
            } else {
                None
            }
        }
        Matcher::UrlEquals(_) => unreachable!("handled above"),
    };

    Ok(mismatch.map(|actual| (matcher.expected(), actual)))
}
