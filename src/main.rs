// ABOUTME: Entry point for the revdeploy CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use revdeploy::config::{self, Config};
use revdeploy::error::Result;
use revdeploy::output::Output;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let output = Output::new(cli.output);
    let result = run(cli).await;

    if let Err(e) = result {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let output = Output::new(cli.output);
    match cli.command {
        Commands::Init { application, force } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, application.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Package => {
            let cwd = env::current_dir()?;
            let config = Config::discover_with_env(&cwd)?;
            commands::package(config, &cwd, output)
        }
        Commands::Check => {
            let cwd = env::current_dir()?;
            let config = Config::discover_with_env(&cwd)?;
            commands::check(config, output)
        }
        Commands::Regions => {
            commands::regions(output);
            Ok(())
        }
    }
}
