//! Loading the hierarchical configuration document
//!
//! The document is TOML. Tables become dotted keys; arrays (including arrays
//! of tables) become list values.

use crate::{Context, Result, Value};
use std::path::Path;

/// Parse a TOML document into a flat context, preserving document order.
pub fn parse_document(text: &str) -> Result<Context> {
    let table: toml::Table = text.parse()?;
    let context = Context::from_table(
        table
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect(),
    );
    tracing::debug!(keys = context.len(), "Parsed configuration document");
    Ok(context)
}

/// Read and parse a TOML document from disk.
pub fn load_document(path: &Path) -> Result<Context> {
    let text = conf_fs::io::read_text(path)?;
    parse_document(&text)
}
