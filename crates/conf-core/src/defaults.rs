//! Default values for keys the document leaves out

use crate::{Context, Value};
use indexmap::IndexMap;

/// `key -> default value`
pub type DefaultValues = IndexMap<String, Value>;

/// Install each default whose key is absent from the context.
pub fn apply_defaults(mut context: Context, defaults: &DefaultValues) -> Context {
    let mut added = 0;
    for (key, value) in defaults {
        if context.insert_if_absent(key.clone(), value.clone()) {
            added += 1;
        }
    }
    tracing::debug!(added, "Applied default values");
    context
}
