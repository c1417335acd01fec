//! Conditional pattern validation
//!
//! Rules are keyed by the target key they check:
//!
//! ```json
//! {
//!   "database.user": [
//!     { "if": { "database.type": "mysql" }, "regex": ".+", "default": "root" }
//!   ]
//! }
//! ```

use crate::{Context, Error, Result, Value};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One conditional check on a target key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Every pair must equal the context value for the rule to apply
    #[serde(default, alias = "if")]
    pub condition: IndexMap<String, Value>,

    /// Must match the whole target value
    #[serde(alias = "regex")]
    pub pattern: String,

    /// Reported instead of the generated message on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Installed when the rule applies and the target key is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ValidationRule {
    fn applies(&self, context: &Context) -> bool {
        self.condition.iter().all(|(key, expected)| {
            context
                .get(key)
                .is_some_and(|actual| actual.to_string() == expected.to_string())
        })
    }
}

/// `target key -> rules`, evaluated in table order.
pub type ValidationRules = IndexMap<String, Vec<ValidationRule>>;

/// Check every applicable rule, failing on the first violation.
///
/// Rules whose condition does not hold are skipped. An applicable rule with a
/// default installs it into the context when the target key is absent, before
/// matching. An absent target is matched as the empty string.
pub fn validate(context: &mut Context, rules: &ValidationRules) -> Result<()> {
    for (key, key_rules) in rules {
        for rule in key_rules {
            if !rule.applies(context) {
                tracing::trace!(%key, "Validation rule skipped");
                continue;
            }

            if let Some(default) = &rule.default {
                if context.insert_if_absent(key.clone(), default.clone()) {
                    tracing::debug!(%key, "Installed validation default");
                }
            }

            let pattern = Regex::new(&format!("^(?:{})$", rule.pattern)).map_err(|source| {
                Error::InvalidPattern {
                    key: key.clone(),
                    source,
                }
            })?;
            let actual = context.get(key).map(Value::to_string).unwrap_or_default();

            if !pattern.is_match(&actual) {
                let message = rule.message.clone().unwrap_or_else(|| {
                    format!(
                        "Value '{actual}' of '{key}' does not match pattern '{}'",
                        rule.pattern
                    )
                });
                return Err(Error::Validation {
                    key: key.clone(),
                    message,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(json: &str) -> ValidationRules {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn rule_without_condition_always_applies() {
        let mut context: Context = [("server.offset", "abc")].into_iter().collect();

        let err = validate(&mut context, &rules(r#"{"server.offset": [{"regex": "[0-9]+"}]}"#))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Value 'abc' of 'server.offset' does not match pattern '[0-9]+'"
        );
    }

    #[test]
    fn pattern_must_match_whole_value() {
        let mut context: Context = [("port", "80a")].into_iter().collect();
        assert!(validate(&mut context, &rules(r#"{"port": [{"pattern": "[0-9]+"}]}"#)).is_err());
    }

    #[test]
    fn custom_message_is_reported() {
        let mut context = Context::new();
        let err = validate(
            &mut context,
            &rules(r#"{"admin.password": [{"regex": ".+", "message": "admin password is required"}]}"#),
        )
        .unwrap_err();

        match err {
            Error::Validation { key, message } => {
                assert_eq!(key, "admin.password");
                assert_eq!(message, "admin password is required");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let mut context: Context = [("a", "b")].into_iter().collect();
        let err = validate(&mut context, &rules(r#"{"a": [{"regex": "("}]}"#)).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
