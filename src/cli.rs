// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nephos")]
#[command(about = "LLM-routed cloud deployment orchestrator for Azure and AWS")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit machine-readable JSON output
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub json: bool,

    /// Only print the final result (for CI)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new nephos.yml configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Route a request and execute the resulting deployment
    Deploy {
        /// Free-text deployment request
        request: String,

        /// Handler parameters as key=value pairs
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Route a request and print the plan without provisioning
    Route {
        /// Free-text deployment request
        request: String,
    },

    /// Show past deployment outcomes
    History,
}
