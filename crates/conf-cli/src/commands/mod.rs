//! Command implementations for conf-cli

pub mod apply;
pub mod check;
pub mod resolve;

pub use apply::run_apply;
pub use check::run_check;
pub use resolve::run_resolve;

use crate::cli::Inputs;
use crate::error::{CliError, Result};
use conf_core::{Context, Pipeline, RuleSet, SystemProperties};
use std::path::Path;

/// System properties from repeated `-D name=value` flags.
fn system_properties(inputs: &Inputs) -> Result<SystemProperties> {
    Ok(SystemProperties::from_assignments(&inputs.define)?)
}

/// Run the pipeline over the configuration document named by `inputs`.
fn resolve_inputs(inputs: &Inputs, resources: Option<&Path>) -> Result<Context> {
    if !inputs.config.is_file() {
        return Err(CliError::user(format!(
            "Configuration file not found: {}",
            inputs.config.display()
        )));
    }

    let rules = resources.map(RuleSet::load).unwrap_or_default();
    let pipeline = Pipeline::new(rules).with_system_properties(system_properties(inputs)?);
    Ok(pipeline.run_file(&inputs.config)?)
}
