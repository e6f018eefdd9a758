//! Run reporting
//!
//! Aggregates per-scenario results into a run summary, printed to the
//! console and optionally written as JSON for tooling.

use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

use crate::common::Result;

use super::runner::ScenarioResult;

/// Result of running a set of scenarios
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<ScenarioResult>,
}

impl RunReport {
    pub fn new(results: Vec<ScenarioResult>, elapsed: Duration) -> Self {
        let passed = results.iter().filter(|r| r.passed()).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            results,
        }
    }

    /// Print per-scenario lines and a summary
    ///
    /// Failed scenarios show the first failing assertion's full diagnostic,
    /// or the aborting error when the failure was not an assertion.
    pub fn print_console(&self) {
        println!();
        for result in &self.results {
            if result.passed() {
                println!(
                    "{} {} ({} ms)",
                    "✓".green(),
                    result.name,
                    result.duration_ms
                );
            } else {
                println!(
                    "{} {} ({} ms, step {}/{})",
                    "✗".red(),
                    result.name,
                    result.duration_ms,
                    result.steps_run,
                    result.steps_total
                );
                for failure in &result.failures {
                    println!(
                        "    step {}: {}",
                        failure.step,
                        failure.to_string().red()
                    );
                }
                if let Some(error) = &result.error {
                    println!("    {}", error.red());
                }
            }
        }

        let summary = format!(
            "{} passed, {} failed ({} ms)",
            self.passed, self.failed, self.duration_ms
        );
        if self.failed == 0 {
            println!("\n{} {}", "✓".green().bold(), summary.green().bold());
        } else {
            println!("\n{} {}", "✗".red().bold(), summary.red().bold());
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
