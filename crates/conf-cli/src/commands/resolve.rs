//! Resolve command implementation

use std::path::Path;

use super::resolve_inputs;
use crate::cli::Inputs;
use crate::error::Result;

/// Run the resolve command
pub fn run_resolve(inputs: &Inputs, resources: Option<&Path>, json: bool) -> Result<()> {
    let context = resolve_inputs(inputs, resources)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&context)?);
    } else {
        for (key, value) in &context {
            println!("{key} = {value}");
        }
    }
    Ok(())
}
