//! Check command implementation

use std::path::Path;

use colored::Colorize;

use super::resolve_inputs;
use crate::cli::Inputs;
use crate::error::Result;

/// Run the check command
pub fn run_check(inputs: &Inputs, resources: Option<&Path>) -> Result<()> {
    let context = resolve_inputs(inputs, resources)?;
    println!(
        "{} {} is valid ({} keys)",
        "OK".green().bold(),
        inputs.config.display(),
        context.len()
    );
    Ok(())
}
