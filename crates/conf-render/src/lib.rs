//! Rendering and deployment for confgen
//!
//! Turns a resolved [`conf_core::Context`] into files: every template under
//! `<resources>/templates` is rendered with Handlebars and written to the
//! output directory, keeping a backup of what it replaces.

pub mod deploy;
pub mod error;
pub mod renderer;
pub mod tree;

pub use deploy::{DeployOptions, DeployReport, Deployer, DeploymentPaths};
pub use error::{Error, Result};
pub use renderer::Renderer;
pub use tree::template_data;
