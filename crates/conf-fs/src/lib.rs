//! Filesystem layer for confgen
//!
//! Provides format-agnostic loading of rule tables, atomic output writes,
//! checksums, template discovery and the metadata used to skip redundant
//! deployments.

pub mod checksum;
pub mod error;
pub mod io;
pub mod metadata;
pub mod store;
pub mod templates;

pub use error::{Error, Result};
pub use metadata::{ChangeSet, Metadata};
pub use store::TableStore;
pub use templates::{TemplateFile, discover_templates};
