//! Error types for conf-fs

use std::path::PathBuf;

/// Result type for conf-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in conf-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} table at {path}: {message}")]
    TableParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} table at {path}: {message}")]
    TableSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported table format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Template directory {path} does not exist or is not a directory")]
    TemplateDirMissing { path: PathBuf },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
