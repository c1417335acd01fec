//! Apply command implementation

use std::path::Path;

use colored::Colorize;
use conf_render::{DeployOptions, DeployReport, Deployer, DeploymentPaths};

use super::system_properties;
use crate::cli::Inputs;
use crate::error::Result;

/// Run the apply command
pub fn run_apply(inputs: &Inputs, resources: &Path, output: &Path, force: bool) -> Result<()> {
    let paths = DeploymentPaths::new(&inputs.config, resources, output);
    let options = DeployOptions {
        force,
        system: system_properties(inputs)?,
    };

    match Deployer::new(paths, options).deploy()? {
        DeployReport::ConfigMissing => {
            println!(
                "{} Configuration file not found: {}",
                "!".yellow().bold(),
                inputs.config.display()
            );
        }
        DeployReport::UpToDate => {
            println!(
                "{} Configuration is up to date (use {} to redeploy)",
                "=".green().bold(),
                "--force".cyan()
            );
        }
        DeployReport::Deployed { written, changes } => {
            for path in changes
                .changed
                .iter()
                .chain(&changes.added)
                .chain(&changes.removed)
            {
                println!("  {} {}", "~".yellow(), path.dimmed());
            }
            for token in &changes.references {
                println!("  {} {}", "~".yellow(), token.dimmed());
            }
            for path in &written {
                println!("  {} {}", "+".green(), path.display());
            }
            println!(
                "{} Deployed {} file(s) to {}",
                "OK".green().bold(),
                written.len(),
                output.display()
            );
        }
    }
    Ok(())
}
