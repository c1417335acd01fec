//! Key renaming through a static alias table

use crate::Context;
use indexmap::IndexMap;

/// `source key -> target key`
pub type AliasTable = IndexMap<String, String>;

/// Rename keys according to `aliases`, carrying values over unchanged.
///
/// Keys without an alias keep their name and position. When two input keys
/// land on the same output key, the later one (in context order) wins and a
/// warning is logged.
pub fn map_keys(context: Context, aliases: &AliasTable) -> Context {
    if aliases.is_empty() {
        return context;
    }

    let mut mapped = Context::new();
    for (key, value) in context {
        let target = aliases.get(&key).cloned().unwrap_or(key);
        if let Some(previous) = mapped.insert(target.clone(), value) {
            tracing::warn!(key = %target, ?previous, "Key mapping collision, later value wins");
        }
    }
    tracing::debug!(aliases = aliases.len(), "Applied key mappings");
    mapped
}
