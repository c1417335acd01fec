//! Error types for conf-render

/// Result type for conf-render operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering or deploying
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A template failed to parse
    #[error("Invalid template {name}: {source}")]
    Template {
        name: String,
        #[source]
        source: handlebars::TemplateError,
    },

    /// A template failed to render against the context
    #[error("Failed to render {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: handlebars::RenderError,
    },

    /// Rendering was requested for a name that was never registered
    #[error("Template not registered: {name}")]
    UnknownTemplate { name: String },

    /// Resolution error from conf-core
    #[error(transparent)]
    Core(#[from] conf_core::Error),

    /// Filesystem error from conf-fs
    #[error(transparent)]
    Fs(#[from] conf_fs::Error),
}
