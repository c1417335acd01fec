//! The resolution pipeline
//!
//! ```text
//! document -> Context -> infer -> defaults -> validate -> resolve -> map keys
//! ```
//!
//! Each stage takes the context by value (validation borrows it mutably) and
//! hands the single owned instance to the next stage.

use crate::{
    Context, ProcessEnvironment, PropertySource, ReferenceResolver, Result, RuleSet,
    SystemProperties, apply_defaults, infer, load_document, map_keys, parse_document, validate,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::Span;

/// A configured pipeline. Runs are independent; each owns its context.
pub struct Pipeline {
    rules: RuleSet,
    system: SystemProperties,
    environment: Box<dyn PropertySource>,
    span: Span,
    runs: AtomicU64,
}

impl Pipeline {
    /// Pipeline over `rules`, reading `$env{..}` from the process environment
    /// and with no system properties.
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            system: SystemProperties::new(),
            environment: Box::new(ProcessEnvironment),
            span: tracing::info_span!("pipeline"),
            runs: AtomicU64::new(0),
        }
    }

    pub fn with_system_properties(mut self, system: SystemProperties) -> Self {
        self.system = system;
        self
    }

    pub fn with_environment(mut self, environment: impl PropertySource + 'static) -> Self {
        self.environment = Box::new(environment);
        self
    }

    /// Parent of the span opened for each run.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn system_properties(&self) -> &SystemProperties {
        &self.system
    }

    pub fn environment(&self) -> &dyn PropertySource {
        self.environment.as_ref()
    }

    /// Number of runs started so far.
    pub fn run_count(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    /// Run every stage over `context` inside a fresh `run` span.
    pub fn run(&self, context: Context) -> Result<Context> {
        let run = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
        let span = tracing::debug_span!(parent: &self.span, "run", run);

        let context = stage(&span, "infer", || Ok(infer(context, &self.rules.inference)))?;
        let mut context = stage(&span, "defaults", || {
            Ok(apply_defaults(context, &self.rules.defaults))
        })?;
        stage(&span, "validate", || validate(&mut context, &self.rules.validation))?;
        let context = stage(&span, "resolve", || {
            ReferenceResolver::new(&self.system, self.environment.as_ref()).resolve(context)
        })?;
        let context = stage(&span, "map", || Ok(map_keys(context, &self.rules.aliases)))?;

        tracing::debug!(parent: &span, keys = context.len(), "Pipeline complete");
        Ok(context)
    }

    /// Parse a TOML document and run the pipeline over it.
    pub fn run_document(&self, text: &str) -> Result<Context> {
        self.run(parse_document(text)?)
    }

    /// Load a TOML document from disk and run the pipeline over it.
    pub fn run_file(&self, path: &Path) -> Result<Context> {
        let context = load_document(path)?;
        self.run(context)
    }
}

fn stage<T>(run: &Span, name: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let span = tracing::debug_span!(parent: run, "stage", stage = name);
    let _entered = span.enter();
    let result = f();
    if let Err(e) = &result {
        tracing::debug!(error = %e, "Stage failed");
    }
    result
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(RuleSet::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use indexmap::IndexMap;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn empty_pipeline_only_resolves() {
        let pipeline = Pipeline::default().with_environment(IndexMap::<String, String>::new());
        let context: Context = [("a", "1"), ("b", "${a}")].into_iter().collect();

        let resolved = pipeline.run(context).unwrap();

        assert_eq!(resolved.get("b"), Some(&Value::from("1")));
    }

    #[test]
    fn mapping_runs_after_resolution() {
        let mut rules = RuleSet::empty();
        rules.aliases.insert("old".to_string(), "new".to_string());
        let pipeline = Pipeline::new(rules);
        let context: Context = [("old", "x"), ("ref", "${old}")].into_iter().collect();

        let resolved = pipeline.run(context).unwrap();

        // references use pre-mapping names
        assert_eq!(resolved.get("new"), Some(&Value::from("x")));
        assert_eq!(resolved.get("ref"), Some(&Value::from("x")));
        assert!(!resolved.contains_key("old"));
    }

    #[test]
    fn each_run_gets_its_own_span() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let pipeline = Pipeline::default()
                .with_environment(IndexMap::<String, String>::new())
                .with_span(tracing::info_span!("deployment"));
            let context: Context = [("a", "1"), ("b", "${a}")].into_iter().collect();

            pipeline.run(context.clone()).unwrap();
            pipeline.run(context).unwrap();

            assert_eq!(pipeline.run_count(), 2);
        });

        let text = log.text();
        assert!(text.contains("deployment:run{run=1}"), "{text}");
        assert!(text.contains("deployment:run{run=2}"), "{text}");
    }
}
