//! Loading the side tables that drive the pipeline
//!
//! A resources directory may contain any of:
//!
//! ```text
//! resources/
//!   infer.json          inference rules
//!   default.json        default values
//!   validator.json      validation rules
//!   key-mappings.json   alias table
//! ```
//!
//! Each table may also be written as `.toml`, `.yaml` or `.yml`. A missing
//! table is empty; an unreadable or malformed one is logged and treated as
//! empty so the rest of the pipeline still runs.

use crate::{AliasTable, DefaultValues, InferenceRules, ValidationRules};
use conf_fs::TableStore;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

pub const INFER_TABLE: &str = "infer";
pub const DEFAULT_TABLE: &str = "default";
pub const VALIDATOR_TABLE: &str = "validator";
pub const MAPPING_TABLE: &str = "key-mappings";

const EXTENSIONS: [&str; 4] = ["json", "toml", "yaml", "yml"];

/// All side tables for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub inference: InferenceRules,
    pub defaults: DefaultValues,
    pub validation: ValidationRules,
    pub aliases: AliasTable,
}

impl RuleSet {
    /// An empty rule set: every stage except resolution is a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every table from `resources_dir`. Never fails.
    pub fn load(resources_dir: &Path) -> Self {
        let store = TableStore::new();
        Self {
            inference: load_table(&store, resources_dir, INFER_TABLE),
            defaults: load_table(&store, resources_dir, DEFAULT_TABLE),
            validation: load_table(&store, resources_dir, VALIDATOR_TABLE),
            aliases: load_table(&store, resources_dir, MAPPING_TABLE),
        }
    }

    /// Paths of the tables present in `resources_dir`.
    pub fn table_paths(resources_dir: &Path) -> Vec<PathBuf> {
        [INFER_TABLE, DEFAULT_TABLE, VALIDATOR_TABLE, MAPPING_TABLE]
            .into_iter()
            .filter_map(|stem| locate(resources_dir, stem))
            .collect()
    }

    /// Visit every string these tables can install into a context: derived
    /// values, default values and validation defaults.
    pub fn for_each_str<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        for derived in self.inference.values().flat_map(IndexMap::values) {
            for value in derived.values() {
                value.for_each_str(f);
            }
        }
        for value in self.defaults.values() {
            value.for_each_str(f);
        }
        for rule in self.validation.values().flatten() {
            if let Some(default) = &rule.default {
                default.for_each_str(f);
            }
        }
    }
}

fn locate(dir: &Path, stem: &str) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

fn load_table<T: DeserializeOwned + Default>(store: &TableStore, dir: &Path, stem: &str) -> T {
    let Some(path) = locate(dir, stem) else {
        tracing::debug!(table = stem, dir = %dir.display(), "Rule table not found, using empty table");
        return T::default();
    };

    match store.load(&path) {
        Ok(table) => {
            tracing::debug!(path = %path.display(), "Loaded rule table");
            table
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to load rule table, using empty table");
            T::default()
        }
    }
}
