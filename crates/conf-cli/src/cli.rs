//! CLI argument parsing using clap derive

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// confgen - Resolve configuration documents and render them into files
#[derive(Parser, Debug)]
#[command(name = "confgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Inputs shared by every command
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct Inputs {
    /// Configuration document (TOML)
    #[arg(short, long, env = "CONFGEN_CONFIG")]
    pub config: PathBuf,

    /// System property available as $sys{NAME}
    #[arg(short = 'D', value_name = "NAME=VALUE")]
    pub define: Vec<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve the configuration and render every template into the output directory
    ///
    /// Skipped when nothing changed since the last run, unless --force is given.
    Apply {
        #[command(flatten)]
        inputs: Inputs,

        /// Directory with rule tables and templates/
        #[arg(short, long, env = "CONFGEN_RESOURCES")]
        resources: PathBuf,

        /// Directory receiving rendered files
        #[arg(short, long)]
        output: PathBuf,

        /// Deploy even if nothing changed
        #[arg(long)]
        force: bool,
    },

    /// Print the resolved configuration
    Resolve {
        #[command(flatten)]
        inputs: Inputs,

        /// Directory with rule tables
        #[arg(short, long, env = "CONFGEN_RESOURCES")]
        resources: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Validate and resolve the configuration without writing anything
    Check {
        #[command(flatten)]
        inputs: Inputs,

        /// Directory with rule tables
        #[arg(short, long, env = "CONFGEN_RESOURCES")]
        resources: Option<PathBuf>,
    },
}
