//! Deploying rendered configuration into an output directory
//!
//! ```text
//! config ──► Pipeline ──► Renderer ──► backup old outputs ──► write outputs
//!   │                                                              │
//!   └──── checksums + $sys/$env values ──► .metadata/deployment.json
//! ```
//!
//! A deployment is skipped when the stored metadata matches the current
//! inputs, unless forced.

use crate::{Renderer, Result};
use conf_core::placeholder::{self, PlaceholderKind};
use conf_core::{Pipeline, PropertySource, RuleSet, SystemProperties};
use conf_fs::io::{copy_file, read_text, remove_dir_if_exists, write_atomic};
use conf_fs::{ChangeSet, Metadata};
use std::path::PathBuf;
use tracing::{Span, debug, info, warn};

pub const TEMPLATES_DIR: &str = "templates";
pub const METADATA_DIR: &str = ".metadata";
pub const METADATA_FILE: &str = "deployment.json";
pub const BACKUP_DIR: &str = "backup";

/// Locations involved in a deployment.
#[derive(Debug, Clone)]
pub struct DeploymentPaths {
    /// The configuration document
    pub config: PathBuf,
    /// Directory holding the rule tables and `templates/`
    pub resources: PathBuf,
    /// Directory that receives rendered files
    pub output: PathBuf,
}

impl DeploymentPaths {
    pub fn new(
        config: impl Into<PathBuf>,
        resources: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config: config.into(),
            resources: resources.into(),
            output: output.into(),
        }
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.resources.join(TEMPLATES_DIR)
    }

    pub fn metadata_file(&self) -> PathBuf {
        self.output.join(METADATA_DIR).join(METADATA_FILE)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.output.join(BACKUP_DIR)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Deploy even when nothing changed
    pub force: bool,
    pub system: SystemProperties,
}

/// Outcome of [`Deployer::deploy`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeployReport {
    /// The configuration document does not exist; nothing was touched
    ConfigMissing,
    /// Inputs match the last deployment
    UpToDate,
    Deployed {
        /// Files written, in template order
        written: Vec<PathBuf>,
        /// Differences from the previous deployment
        changes: ChangeSet,
    },
}

pub struct Deployer {
    paths: DeploymentPaths,
    force: bool,
    pipeline: Pipeline,
}

impl Deployer {
    /// Load rule tables from the resources directory and prepare a pipeline.
    pub fn new(paths: DeploymentPaths, options: DeployOptions) -> Self {
        let pipeline =
            Pipeline::new(RuleSet::load(&paths.resources)).with_system_properties(options.system);
        Self {
            paths,
            force: options.force,
            pipeline,
        }
    }

    pub fn with_environment(mut self, environment: impl PropertySource + 'static) -> Self {
        self.pipeline = self.pipeline.with_environment(environment);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.pipeline = self.pipeline.with_span(span);
        self
    }

    pub fn paths(&self) -> &DeploymentPaths {
        &self.paths
    }

    pub fn deploy(&self) -> Result<DeployReport> {
        let config = &self.paths.config;
        if !config.is_file() {
            warn!(path = %config.display(), "Configuration file not found; nothing deployed");
            return Ok(DeployReport::ConfigMissing);
        }

        let document = read_text(config)?;
        let mut snapshot = self.snapshot(&document)?;

        let metadata_file = self.paths.metadata_file();
        let previous = match Metadata::load(&metadata_file) {
            Ok(previous) => previous,
            Err(e) => {
                warn!(path = %metadata_file.display(), error = %e, "Ignoring unreadable deployment metadata");
                None
            }
        };

        let changes = snapshot.diff(previous.as_ref().unwrap_or(&Metadata::new()));
        if previous.is_some() && changes.is_empty() {
            if !self.force {
                info!("Configuration is up to date; skipping deployment");
                return Ok(DeployReport::UpToDate);
            }
            info!("Configuration unchanged; deploying because forced");
        }
        log_changes(&changes);

        let renderer = Renderer::from_dir(&self.paths.templates_dir())?;
        let context = self.pipeline.run_document(&document)?;
        let rendered = renderer.render_all(&context)?;

        self.backup(rendered.keys().map(String::as_str))?;

        let mut written = Vec::with_capacity(rendered.len());
        for (output, content) in &rendered {
            let target = self.paths.output.join(output);
            write_atomic(&target, content.as_bytes())?;
            debug!(path = %target.display(), "Wrote rendered file");
            written.push(target);
        }

        if let Err(e) = snapshot.save(&metadata_file) {
            warn!(path = %metadata_file.display(), error = %e, "Failed to store deployment metadata");
        }

        info!(files = written.len(), output = %self.paths.output.display(), "Deployment complete");
        Ok(DeployReport::Deployed { written, changes })
    }

    /// Checksums of every input plus the current values of the external
    /// properties referenced by the document or by values the rule tables
    /// install.
    fn snapshot(&self, document: &str) -> Result<Metadata> {
        let mut metadata = Metadata::new();
        metadata.record_path(&self.paths.config)?;
        metadata.record_path(&self.paths.templates_dir())?;
        for table in RuleSet::table_paths(&self.paths.resources) {
            metadata.record_path(&table)?;
        }

        let mut placeholders = placeholder::scan(document);
        self.pipeline
            .rules()
            .for_each_str(&mut |text: &str| placeholders.extend(placeholder::scan(text)));

        for found in placeholders {
            let value = match found.kind {
                PlaceholderKind::Reference => continue,
                PlaceholderKind::System => self.pipeline.system_properties().property(&found.name),
                PlaceholderKind::Environment => self.pipeline.environment().property(&found.name),
            };
            metadata.record_reference(found.kind.token(&found.name), value);
        }

        Ok(metadata)
    }

    /// Copy existing outputs about to be overwritten into the backup directory,
    /// replacing any previous backup.
    fn backup<'a>(&self, outputs: impl Iterator<Item = &'a str>) -> Result<()> {
        let backup_dir = self.paths.backup_dir();
        remove_dir_if_exists(&backup_dir)?;

        for output in outputs {
            let existing = self.paths.output.join(output);
            if existing.is_file() {
                copy_file(&existing, &backup_dir.join(output))?;
                debug!(path = %existing.display(), "Backed up");
            }
        }
        Ok(())
    }
}

fn log_changes(changes: &ChangeSet) {
    for path in &changes.changed {
        info!(path = %path, "Input changed");
    }
    for path in &changes.added {
        info!(path = %path, "Input added");
    }
    for path in &changes.removed {
        info!(path = %path, "Input removed");
    }
    for token in &changes.references {
        info!(reference = %token, "Referenced property changed");
    }
}
