//! pagecheck - declarative acceptance-test runner
//!
//! Drives a server-rendered web application over HTTP the way a scriptless
//! browser would — page loads, form fills, clicks — and asserts on the
//! resulting documents with bounded polling. Scenarios are declarative
//! YAML; each runs in an isolated session.

pub mod browser;
pub mod check;
pub mod cli;
pub mod commands;
pub mod common;
pub mod dom;
pub mod scenario;

// Re-export commonly used types
pub use browser::{Credentials, Navigator, Session};
pub use common::{Error, HarnessConfig, Result};
pub use dom::{Document, Target};
pub use scenario::{Scenario, ScenarioResult, ScenarioRunner, ScenarioStatus};
