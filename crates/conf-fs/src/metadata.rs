//! Deployment metadata for change detection
//!
//! A deployment records the checksum of every input (the configuration
//! document, the template directory, each rule table) and the value of every
//! external property the document referenced. A later deployment with equal
//! metadata has nothing to do.

use crate::checksum::compute_path_checksum;
use crate::{Result, TableStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Snapshot of deployment inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// When this snapshot was written; ignored by comparisons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,

    /// Input path -> checksum
    #[serde(default)]
    pub inputs: BTreeMap<String, String>,

    /// Placeholder token (e.g. `$env{STAGE}`) -> value at deployment time
    #[serde(default)]
    pub references: BTreeMap<String, Option<String>>,
}

/// Differences between two metadata snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub changed: Vec<String>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub references: Vec<String>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && self.references.is_empty()
    }
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the checksum of a file or directory. Absent paths are skipped.
    pub fn record_path(&mut self, path: &Path) -> Result<()> {
        if let Some(checksum) = compute_path_checksum(path)? {
            self.inputs
                .insert(path.to_string_lossy().replace('\\', "/"), checksum);
        }
        Ok(())
    }

    /// Record the current value of an external property reference.
    pub fn record_reference(&mut self, token: impl Into<String>, value: Option<String>) {
        self.references.insert(token.into(), value);
    }

    /// Load stored metadata. A missing file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        TableStore::new().load(path).map(Some)
    }

    /// Stamp and store this snapshot.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.generated_at = Some(Utc::now());
        TableStore::new().save(path, self)
    }

    /// What changed going from `previous` to `self`.
    pub fn diff(&self, previous: &Metadata) -> ChangeSet {
        let mut changes = ChangeSet::default();

        for (path, checksum) in &self.inputs {
            match previous.inputs.get(path) {
                Some(old) if old == checksum => {}
                Some(_) => changes.changed.push(path.clone()),
                None => changes.added.push(path.clone()),
            }
        }
        for path in previous.inputs.keys() {
            if !self.inputs.contains_key(path) {
                changes.removed.push(path.clone());
            }
        }

        for (token, value) in &self.references {
            if previous.references.get(token) != Some(value) {
                changes.references.push(token.clone());
            }
        }
        for token in previous.references.keys() {
            if !self.references.contains_key(token) {
                changes.references.push(token.clone());
            }
        }

        changes
    }
}
