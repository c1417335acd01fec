//! Template data built from a resolved context
//!
//! Dotted keys are expanded into nested objects so templates can write
//! `{{server.hostname}}`. Every flat key is also kept at the root, reachable
//! as `{{[server.hostname]}}`, which matters when a scalar and a subtree
//! compete for one path (`a = 1` and `a.b = 2`): the first one written keeps
//! the nested slot.

use conf_core::{Context, Value};
use serde_json::{Map, Number, Value as Json};

/// Convert a context value to JSON.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Boolean(b) => Json::Bool(*b),
        Value::Integer(i) => Json::Number((*i).into()),
        Value::Float(x) => Number::from_f64(*x)
            .map(Json::Number)
            .unwrap_or_else(|| Json::String(x.to_string())),
        Value::String(s) => Json::String(s.clone()),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Table(table) => Json::Object(
            table
                .iter()
                .map(|(key, item)| (key.clone(), value_to_json(item)))
                .collect(),
        ),
    }
}

/// Build the template data object for `context`.
pub fn template_data(context: &Context) -> Json {
    let mut root = Map::new();

    for (key, value) in context {
        let json = value_to_json(value);
        if key.contains('.') {
            if !insert_nested(&mut root, key, json.clone()) {
                tracing::warn!(%key, "Key path is already taken; reachable only by its flat name");
            }
            root.insert(key.clone(), json);
        } else if root.contains_key(key.as_str()) {
            tracing::warn!(%key, "Key is already used as a table; keeping the first value");
        } else {
            root.insert(key.clone(), json);
        }
    }

    Json::Object(root)
}

/// Place `value` at the dotted `path`. Returns false when a scalar or an
/// existing subtree is in the way.
fn insert_nested(root: &mut Map<String, Json>, path: &str, value: Json) -> bool {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return false;
    };

    let mut current = root;
    for segment in segments {
        let slot = current
            .entry(segment.to_string())
            .or_insert_with(|| Json::Object(Map::new()));
        match slot {
            Json::Object(map) => current = map,
            _ => return false,
        }
    }

    if current.contains_key(leaf) {
        return false;
    }
    current.insert(leaf.to_string(), value);
    true
}
