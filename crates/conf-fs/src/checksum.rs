//! SHA-256 checksum utilities
//!
//! Checksums use the canonical `sha256:<hex>` form. Directories are hashed
//! over their sorted relative file paths and file contents, so any added,
//! removed, renamed or edited file changes the directory checksum.

use crate::{Error, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of string content.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the SHA-256 checksum of a file's contents.
pub fn compute_file_checksum(path: &Path) -> Result<String> {
    let content = fs::read(path).map_err(|e| Error::io(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

/// Compute a checksum covering every file below `dir`.
pub fn compute_dir_checksum(dir: &Path) -> Result<String> {
    let mut files = Vec::new();
    collect_files(dir, &mut files)?;
    files.sort();

    let mut hasher = Sha256::new();
    for file in files {
        let relative = file.strip_prefix(dir).unwrap_or(&file);
        hasher.update(relative.to_string_lossy().replace('\\', "/").as_bytes());
        hasher.update([0u8]);
        hasher.update(fs::read(&file).map_err(|e| Error::io(&file, e))?);
        hasher.update([0u8]);
    }
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

/// Checksum of a file or directory, or `None` when the path does not exist.
pub fn compute_path_checksum(path: &Path) -> Result<Option<String>> {
    if path.is_dir() {
        compute_dir_checksum(path).map(Some)
    } else if path.is_file() {
        compute_file_checksum(path).map(Some)
    } else {
        Ok(None)
    }
}

pub(crate) fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|e| Error::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}
