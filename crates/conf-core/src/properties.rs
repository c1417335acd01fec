//! Sources for `$sys{..}` and `$env{..}` placeholders
//!
//! These lookups are the pipeline's only external inputs. They are passed in
//! explicitly so a run never depends on hidden process-wide state other than
//! the environment itself, and tests can substitute plain maps.

use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::HashMap;

/// A read-only named property lookup.
pub trait PropertySource {
    fn property(&self, name: &str) -> Option<String>;
}

/// The process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl PropertySource for ProcessEnvironment {
    fn property(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Caller-supplied system properties (`-D name=value`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemProperties {
    values: IndexMap<String, String>,
}

impl SystemProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse a `name=value` assignment. The value may itself contain `=`.
    pub fn parse_assignment(assignment: &str) -> Result<(String, String)> {
        match assignment.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => Err(Error::InvalidProperty {
                assignment: assignment.to_string(),
            }),
        }
    }

    /// Build from `name=value` assignments; later assignments win.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut properties = Self::new();
        for assignment in assignments {
            let (name, value) = Self::parse_assignment(assignment.as_ref())?;
            properties.set(name, value);
        }
        Ok(properties)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SystemProperties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl PropertySource for SystemProperties {
    fn property(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

impl PropertySource for HashMap<String, String> {
    fn property(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl PropertySource for IndexMap<String, String> {
    fn property(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<T: PropertySource + ?Sized> PropertySource for &T {
    fn property(&self, name: &str) -> Option<String> {
        (**self).property(name)
    }
}
