//! pagecheck - declarative acceptance tests for server-rendered web apps
//!
//! Scenarios are YAML files of navigate/fill/click/expect steps, executed
//! over plain HTTP with an isolated session per scenario.

use clap::Parser;
use pagecheck::{cli, commands::Commands, common::logging};

#[derive(Parser)]
#[command(name = "pagecheck", about = "Acceptance tests for server-rendered web apps")]
#[command(version, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logging::init_cli(cli.verbose);

    if let Err(e) = cli::dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
