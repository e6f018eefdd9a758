//! CLI command definitions
//!
//! Defines the clap commands for the pagecheck CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run scenario files or directories against the application
    Run {
        /// Scenario files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Base URL of the application under test (overrides config)
        #[arg(long)]
        base_url: Option<String>,

        /// Number of scenarios to run concurrently (overrides config)
        #[arg(long, short = 'j')]
        jobs: Option<usize>,

        /// Only run scenarios carrying this tag
        #[arg(long)]
        tag: Option<String>,

        /// Write a JSON report to this path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Path to a pagecheck.toml config file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Parse scenario files and report problems without running them
    Validate {
        /// Scenario files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List discovered scenarios with their tags and step counts
    List {
        /// Directory to search for scenario files
        dir: PathBuf,

        /// Only list scenarios carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },
}
