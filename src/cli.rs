// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use revdeploy::output::OutputMode;

#[derive(Parser)]
#[command(name = "revdeploy")]
#[command(about = "Package application revisions and drive their deployment lifecycle")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputMode::Normal, global = true)]
    pub output: OutputMode,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new revdeploy.yml configuration file
    Init {
        /// Application name for the template
        #[arg(short, long)]
        application: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Build the revision archive and print its path
    Package,

    /// Validate the configuration, including environment overrides
    Check,

    /// List known region codes
    Regions,
}
