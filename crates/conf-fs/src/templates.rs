//! Template directory discovery
//!
//! Every file below the template directory is a template. Its output path is
//! its path relative to the template directory, minus a trailing `.hbs`.

use crate::checksum::collect_files;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Extension stripped from template names to form output names.
pub const TEMPLATE_EXTENSION: &str = ".hbs";

/// A template file found under the template directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Absolute (or caller-relative) path of the template source
    pub source: PathBuf,
    /// Path relative to the template directory, forward slashes
    pub name: String,
    /// Path of the rendered file relative to the output directory
    pub output: String,
}

/// Collect all templates below `dir`, sorted by name.
pub fn discover_templates(dir: &Path) -> Result<Vec<TemplateFile>> {
    if !dir.is_dir() {
        return Err(Error::TemplateDirMissing {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    collect_files(dir, &mut files)?;

    let mut templates: Vec<TemplateFile> = files
        .into_iter()
        .map(|source| {
            let name = source
                .strip_prefix(dir)
                .unwrap_or(&source)
                .to_string_lossy()
                .replace('\\', "/");
            let output = name
                .strip_suffix(TEMPLATE_EXTENSION)
                .unwrap_or(&name)
                .to_string();
            TemplateFile {
                source,
                name,
                output,
            }
        })
        .collect();
    templates.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!(count = templates.len(), dir = %dir.display(), "Discovered templates");
    Ok(templates)
}
