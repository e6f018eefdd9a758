//! Unique test-data identifiers
//!
//! Scenario values may contain the `{unique}` placeholder; the runner
//! substitutes it once per scenario execution from an injected source.
//! The default source is UUID-based so concurrent runs against a shared
//! server cannot collide; tests inject the sequential source to keep
//! generated names reproducible.

use std::sync::atomic::{AtomicU64, Ordering};

/// Placeholder replaced in scenario values before execution
pub const PLACEHOLDER: &str = "{unique}";

/// Source of per-scenario unique identifiers
pub trait IdSource: Send + Sync {
    fn next_id(&self) -> String;
}

/// Collision-free identifiers for real runs
#[derive(Debug, Default)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

/// Deterministic identifiers for tests
#[derive(Debug)]
pub struct SequenceSource {
    prefix: String,
    counter: AtomicU64,
}

impl SequenceSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdSource for SequenceSource {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{n}", self.prefix)
    }
}

/// Replace every `{unique}` occurrence in a value
pub fn substitute(value: &str, id: &str) -> String {
    value.replace(PLACEHOLDER, id)
}
