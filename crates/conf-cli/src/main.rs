//! confgen CLI
//!
//! Resolves layered configuration documents and renders them through
//! templates into deployable files.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} configuration generator", "confgen".green().bold());
            println!();
            println!("Run {} for available commands.", "confgen --help".cyan());
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Apply {
            inputs,
            resources,
            output,
            force,
        } => commands::run_apply(&inputs, &resources, &output, force),
        Commands::Resolve {
            inputs,
            resources,
            json,
        } => commands::run_resolve(&inputs, resources.as_deref(), json),
        Commands::Check { inputs, resources } => {
            commands::run_check(&inputs, resources.as_deref())
        }
    }
}
