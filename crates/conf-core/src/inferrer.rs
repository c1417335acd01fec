//! Derivation of implied keys from observed values

use crate::{Context, Value};
use indexmap::IndexMap;

/// `observed key -> observed value (string form) -> derived key -> derived value`
pub type InferenceRules = IndexMap<String, IndexMap<String, IndexMap<String, Value>>>;

/// Add every value implied by `rules` that the context does not already hold.
///
/// Observed values are compared by their string form, so a list value is
/// looked up as `[a, b]`. Derived entries never overwrite: neither existing
/// keys nor entries derived earlier in the same pass. Derived entries do not
/// trigger further inference.
pub fn infer(mut context: Context, rules: &InferenceRules) -> Context {
    if rules.is_empty() {
        return context;
    }

    let mut derived = Vec::new();
    for (key, value) in &context {
        let Some(by_value) = rules.get(key) else {
            continue;
        };
        if let Some(implied) = by_value.get(&value.to_string()) {
            derived.extend(implied.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    let mut added = 0;
    for (key, value) in derived {
        if context.insert_if_absent(key.clone(), value) {
            tracing::trace!(%key, "Inferred value");
            added += 1;
        }
    }
    tracing::debug!(added, "Applied inference rules");
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rules(json: &str) -> InferenceRules {
        serde_json::from_str(json).unwrap()
    }

    const DB_RULES: &str = r#"{
        "database.type": {
            "mysql": {
                "database.driver": "com.mysql.jdbc.Driver",
                "database.port": 3306
            },
            "h2": {
                "database.driver": "org.h2.Driver"
            }
        }
    }"#;

    #[test]
    fn adds_derived_keys_for_matching_value() {
        let context: Context = [("database.type", "mysql")].into_iter().collect();

        let inferred = infer(context, &rules(DB_RULES));

        assert_eq!(
            inferred.get("database.driver"),
            Some(&Value::from("com.mysql.jdbc.Driver"))
        );
        assert_eq!(inferred.get("database.port"), Some(&Value::Integer(3306)));
    }

    #[test]
    fn never_overwrites_existing_keys() {
        let context: Context = [
            ("database.type", Value::from("mysql")),
            ("database.port", Value::Integer(13306)),
        ]
        .into_iter()
        .collect();

        let inferred = infer(context, &rules(DB_RULES));

        assert_eq!(inferred.get("database.port"), Some(&Value::Integer(13306)));
    }

    #[test]
    fn unmatched_value_adds_nothing() {
        let context: Context = [("database.type", "oracle")].into_iter().collect();

        let inferred = infer(context.clone(), &rules(DB_RULES));

        assert_eq!(inferred, context);
    }

    #[test]
    fn non_string_values_match_by_string_form() {
        let context: Context = [("ssl.enabled", Value::Boolean(true))].into_iter().collect();

        let inferred = infer(
            context,
            &rules(r#"{"ssl.enabled": {"true": {"server.scheme": "https"}}}"#),
        );

        assert_eq!(inferred.get("server.scheme"), Some(&Value::from("https")));
    }

    #[test]
    fn list_values_match_by_collection_string_form() {
        let context: Context = [("roles", Value::from(vec!["admin", "user"]))]
            .into_iter()
            .collect();

        let inferred = infer(
            context,
            &rules(r#"{"roles": {"[admin, user]": {"roles.default": "admin"}}}"#),
        );

        assert_eq!(inferred.get("roles.default"), Some(&Value::from("admin")));
    }

    #[test]
    fn first_derivation_wins_between_rules() {
        let context: Context = [("a", "1"), ("b", "2")].into_iter().collect();

        let inferred = infer(
            context,
            &rules(r#"{"a": {"1": {"c": "from-a"}}, "b": {"2": {"c": "from-b"}}}"#),
        );

        assert_eq!(inferred.get("c"), Some(&Value::from("from-a")));
    }
}
