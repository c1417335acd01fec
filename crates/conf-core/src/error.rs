//! Error types for conf-core

use crate::PlaceholderKind;

/// Result type for conf-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or resolving a configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A `${ref}` placeholder names a key that does not exist
    #[error("Referenced key '{reference}' does not exist (referenced from '{key}')")]
    MissingReference { reference: String, key: String },

    /// References that can never be resolved, e.g. a cycle
    #[error("Unresolvable references in keys: {}", keys.join(", "))]
    UnresolvableReference { keys: Vec<String> },

    /// A validation rule rejected a value
    #[error("{message}")]
    Validation { key: String, message: String },

    /// A `$sys{..}` or `$env{..}` placeholder with no value available
    #[error("Undefined {kind} '{name}' (referenced from '{key}')")]
    MissingProperty {
        kind: PlaceholderKind,
        name: String,
        key: String,
    },

    /// A validation rule carries a pattern that does not compile
    #[error("Invalid validation pattern for '{key}': {source}")]
    InvalidPattern {
        key: String,
        #[source]
        source: regex::Error,
    },

    /// A `name=value` system property assignment without `=`
    #[error("Invalid system property '{assignment}', expected name=value")]
    InvalidProperty { assignment: String },

    /// The fixpoint loop ran past its bound; indicates a resolver bug
    #[error("Reference resolution exceeded its bound of {limit} iterations")]
    IterationLimit { limit: usize },

    /// The configuration document is not valid TOML
    #[error("Invalid configuration document: {0}")]
    Document(#[from] toml::de::Error),

    /// Filesystem error from conf-fs
    #[error(transparent)]
    Fs(#[from] conf_fs::Error),
}

impl Error {
    /// Keys implicated by this error, for callers that report them.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Error::MissingReference { key, .. }
            | Error::Validation { key, .. }
            | Error::MissingProperty { key, .. }
            | Error::InvalidPattern { key, .. } => vec![key.as_str()],
            Error::UnresolvableReference { keys } => keys.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}
