//! Error types for the acceptance-test runner
//!
//! Failures are grouped by where they arise: navigation (network/HTTP),
//! target resolution (selector matching), expectation mismatches, and
//! authentication. Diagnostics carry the attempted URL or target so a
//! failing scenario can be read without re-running it.

use std::io;
use thiserror::Error;

use crate::check::AssertionFailure;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the runner
#[derive(Error, Debug)]
pub enum Error {
    // === Navigation Errors ===
    #[error("navigation to {url} failed: {reason}")]
    NavigationFailed {
        url: String,
        /// HTTP status, when a response was received at all
        status: Option<u16>,
        reason: String,
    },

    #[error("no document loaded; navigate to a page before interacting with it")]
    NoDocument,

    // === Target Resolution Errors ===
    #[error("no element matched {target}")]
    ElementNotFound { target: String },

    #[error("{target} matched {count} elements, expected exactly one")]
    AmbiguousSelector { target: String, count: usize },

    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },

    #[error("{target} is not a fillable form control")]
    NotFillable { target: String },

    // === Authentication Errors ===
    #[error("{action} rejected with HTTP {status}")]
    Auth { action: &'static str, status: u16 },

    // === Expectation Errors ===
    #[error("assertion failed: {0}")]
    Assertion(AssertionFailure),

    // === Scenario Errors ===
    #[error("invalid scenario: {0}")]
    ScenarioParse(String),

    #[error("scenario timed out after {0} seconds")]
    ScenarioTimeout(u64),

    #[error("{0} scenario(s) failed")]
    RunFailed(usize),

    // === Configuration Errors ===
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a navigation failure for a transport-level error (no response)
    pub fn navigation(url: &url::Url, err: &reqwest::Error) -> Self {
        Self::NavigationFailed {
            url: url.to_string(),
            status: err.status().map(|s| s.as_u16()),
            reason: err.to_string(),
        }
    }

    /// Create a navigation failure for an HTTP error status
    pub fn http_status(url: &url::Url, status: reqwest::StatusCode) -> Self {
        Self::NavigationFailed {
            url: url.to_string(),
            status: Some(status.as_u16()),
            reason: format!("HTTP {status}"),
        }
    }

    /// Create an invalid-selector error
    pub fn selector(selector: &str, reason: impl ToString) -> Self {
        Self::Selector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        }
    }
}
