//! Configuration resolution pipeline for confgen
//!
//! Turns a hierarchical TOML document plus inference, default, validation and
//! key-mapping tables into a flat, fully resolved key-value [`Context`] ready
//! for template rendering.
//!
//! # Architecture
//!
//! ```text
//!   deployment.toml
//!         |
//!    parse_document          (flatten to dotted keys)
//!         |
//!       infer                (derive implied keys)
//!         |
//!   apply_defaults           (fill absent keys)
//!         |
//!      validate              (conditional regex rules)
//!         |
//!  ReferenceResolver         ($sys{..}, $env{..}, ${..})
//!         |
//!      map_keys              (alias table)
//!         |
//!   renderer (conf-render)
//! ```
//!
//! # Example
//!
//! ```
//! use conf_core::{Pipeline, RuleSet, Value};
//!
//! let pipeline = Pipeline::new(RuleSet::empty());
//! let context = pipeline
//!     .run_document(
//!         r#"
//! [server]
//! hostname = "localhost"
//! url = "https://${server.hostname}:9443"
//! "#,
//!     )
//!     .unwrap();
//!
//! assert_eq!(
//!     context.get("server.url"),
//!     Some(&Value::from("https://localhost:9443"))
//! );
//! ```

pub mod context;
pub mod defaults;
pub mod document;
pub mod error;
pub mod inferrer;
pub mod mapper;
pub mod pipeline;
pub mod placeholder;
pub mod properties;
pub mod resolver;
pub mod rules;
pub mod validator;
pub mod value;

pub use context::Context;
pub use defaults::{DefaultValues, apply_defaults};
pub use document::{load_document, parse_document};
pub use error::{Error, Result};
pub use inferrer::{InferenceRules, infer};
pub use mapper::{AliasTable, map_keys};
pub use pipeline::Pipeline;
pub use placeholder::{Placeholder, PlaceholderKind};
pub use properties::{ProcessEnvironment, PropertySource, SystemProperties};
pub use resolver::{ReferenceResolver, resolve};
pub use rules::RuleSet;
pub use validator::{ValidationRule, ValidationRules, validate};
pub use value::Value;
