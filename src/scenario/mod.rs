//! Scenario model and execution
//!
//! Scenarios are YAML files of navigate/fill/click/expect steps. The
//! runner executes them in isolation — fresh session each, teardown
//! guaranteed — and aggregates a run report.

mod config;
pub mod ids;
mod report;
mod runner;

pub use config::{load_paths, Scenario, Setup, Step};
pub use report::RunReport;
pub use runner::{ScenarioResult, ScenarioRunner, ScenarioStatus};
