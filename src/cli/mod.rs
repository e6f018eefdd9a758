//! CLI command handling
//!
//! Dispatches CLI commands: loads configuration and scenarios, drives the
//! runner, and formats output.

use colored::Colorize;
use tracing::info;

use crate::commands::Commands;
use crate::common::{Error, HarnessConfig, Result};
use crate::scenario::{self, Scenario, ScenarioRunner};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            paths,
            base_url,
            jobs,
            tag,
            output,
            config,
        } => {
            let mut config = HarnessConfig::load(config.as_deref())?;
            if let Some(base_url) = base_url {
                config.base_url = base_url;
            }
            // fail on an unusable base URL before any scenario runs
            config.base()?;

            let scenarios = filter_by_tag(scenario::load_paths(&paths)?, tag.as_deref());
            if scenarios.is_empty() {
                return Err(Error::Config("no scenarios to run".to_string()));
            }

            let jobs = jobs.unwrap_or(config.runner.jobs);
            info!(
                scenarios = scenarios.len(),
                jobs,
                base_url = %config.base_url,
                "starting run"
            );

            let runner = ScenarioRunner::new(config);
            let report = runner.run_all(&scenarios, jobs).await;
            report.print_console();

            if let Some(path) = output {
                report.write_json(&path)?;
                println!("report written to {}", path.display());
            }

            if report.failed > 0 {
                return Err(Error::RunFailed(report.failed));
            }
            Ok(())
        }

        Commands::Validate { paths } => {
            let scenarios = scenario::load_paths(&paths)?;
            for scenario in &scenarios {
                println!(
                    "{} {} ({} step{})",
                    "✓".green(),
                    scenario.name,
                    scenario.steps.len(),
                    if scenario.steps.len() == 1 { "" } else { "s" }
                );
            }
            println!("{} scenario(s) valid", scenarios.len());
            Ok(())
        }

        Commands::List { dir, tag } => {
            let scenarios = filter_by_tag(scenario::load_paths(&[dir])?, tag.as_deref());
            if scenarios.is_empty() {
                println!("no scenarios found");
                return Ok(());
            }
            for scenario in &scenarios {
                let tags = if scenario.tags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", scenario.tags.join(", "))
                };
                match &scenario.description {
                    Some(description) => {
                        println!("{}{} - {}", scenario.name.bold(), tags.dimmed(), description)
                    }
                    None => println!("{}{}", scenario.name.bold(), tags.dimmed()),
                }
            }
            Ok(())
        }
    }
}

fn filter_by_tag(scenarios: Vec<Scenario>, tag: Option<&str>) -> Vec<Scenario> {
    match tag {
        Some(tag) => scenarios.into_iter().filter(|s| s.has_tag(tag)).collect(),
        None => scenarios,
    }
}
