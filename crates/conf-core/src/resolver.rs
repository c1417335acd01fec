//! Placeholder resolution
//!
//! Resolution runs in three phases:
//!
//! 1. `$sys{name}` placeholders are replaced from the system properties.
//! 2. `$env{NAME}` placeholders are replaced from the environment.
//! 3. `${key}` placeholders are replaced with other context values.
//!
//! The first two phases are single passes: property values are never
//! re-scanned for further properties. The third phase may chain (`c` refers to
//! `b`, which refers to `a`), so it runs a bounded fixpoint loop over the
//! dependency graph:
//!
//! ```text
//! edges:  dependent key -> keys it references
//! ready:  referenced keys that are not themselves dependents
//! step:   substitute every ready key into its dependents, drop those edges
//! ```
//!
//! A step that finds nothing ready means the remaining keys form (or hang off)
//! a cycle, and every one of them is reported.

use crate::placeholder::{self, PlaceholderKind};
use crate::{Context, Error, ProcessEnvironment, PropertySource, Result, SystemProperties, Value};
use indexmap::{IndexMap, IndexSet};

/// Resolve placeholders using the process environment and no system
/// properties.
pub fn resolve(context: Context) -> Result<Context> {
    ReferenceResolver::new(&SystemProperties::new(), &ProcessEnvironment).resolve(context)
}

/// Rewrites every placeholder in a context.
pub struct ReferenceResolver<'a> {
    system: &'a dyn PropertySource,
    environment: &'a dyn PropertySource,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(system: &'a dyn PropertySource, environment: &'a dyn PropertySource) -> Self {
        Self {
            system,
            environment,
        }
    }

    /// Resolve all placeholders, or fail without a partial result.
    pub fn resolve(&self, mut context: Context) -> Result<Context> {
        substitute_properties(&mut context, PlaceholderKind::System, self.system)?;
        substitute_properties(&mut context, PlaceholderKind::Environment, self.environment)?;
        resolve_references(context)
    }
}

fn substitute_properties(
    context: &mut Context,
    kind: PlaceholderKind,
    source: &dyn PropertySource,
) -> Result<()> {
    for (key, value) in context.iter_mut() {
        value.try_for_each_str_mut(&mut |text: &mut String| -> Result<()> {
            if placeholder::contains(text, kind) {
                *text = placeholder::substitute(text, kind, |name| {
                    source.property(name).ok_or_else(|| Error::MissingProperty {
                        kind,
                        name: name.to_string(),
                        key: key.clone(),
                    })
                })?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

/// Outcome of one fixpoint iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// This many edges were resolved
    Progress(usize),
    NoProgress,
}

/// Outstanding `${key}` edges, in context order.
#[derive(Debug, Default)]
struct DependencyGraph {
    edges: IndexMap<String, IndexSet<String>>,
}

impl DependencyGraph {
    /// Collect every reference edge, failing on references to absent keys.
    fn build(context: &Context) -> Result<Self> {
        let mut graph = Self::default();
        for (key, value) in context {
            let mut references = IndexSet::new();
            value.for_each_str(&mut |text: &str| {
                references.extend(placeholder::names(text, PlaceholderKind::Reference));
            });

            if let Some(reference) = references.iter().find(|r| !context.contains_key(r.as_str())) {
                return Err(Error::MissingReference {
                    reference: reference.clone(),
                    key: key.clone(),
                });
            }
            if !references.is_empty() {
                graph.edges.insert(key.clone(), references);
            }
        }
        Ok(graph)
    }

    fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    fn edge_count(&self) -> usize {
        self.edges.values().map(IndexSet::len).sum()
    }

    /// Referenced keys whose own values are placeholder-free.
    fn ready(&self) -> IndexSet<String> {
        self.edges
            .values()
            .flatten()
            .filter(|reference| !self.edges.contains_key(reference.as_str()))
            .cloned()
            .collect()
    }

    /// Keys that still hold unresolved references.
    fn dependents(&self) -> Vec<String> {
        self.edges.keys().cloned().collect()
    }

    /// Substitute every ready key into the keys that reference it.
    fn step(&mut self, context: &mut Context) -> Step {
        let ready = self.ready();
        if ready.is_empty() {
            return Step::NoProgress;
        }

        let values: IndexMap<String, Value> = ready
            .iter()
            .filter_map(|key| context.get(key).map(|v| (key.clone(), v.clone())))
            .collect();

        let mut resolved = 0;
        for (dependent, references) in self.edges.iter_mut() {
            let Some(target) = context.get_mut(dependent) else {
                continue;
            };
            let hits: Vec<String> = references
                .iter()
                .filter(|r| values.contains_key(r.as_str()))
                .cloned()
                .collect();

            for reference in hits {
                match &values[&reference] {
                    // A list cannot be spliced into text: it replaces the
                    // dependent value wholesale, which leaves nothing to resolve.
                    list @ Value::List(_) => {
                        *target = list.clone();
                        resolved += references.len();
                        references.clear();
                        break;
                    }
                    value => {
                        let token = PlaceholderKind::Reference.token(&reference);
                        let text = value.to_string();
                        let _ = target.try_for_each_str_mut(&mut |s: &mut String| {
                            if s.contains(&token) {
                                *s = s.replace(&token, &text);
                            }
                            Ok::<(), std::convert::Infallible>(())
                        });
                        references.shift_remove(&reference);
                        resolved += 1;
                    }
                }
            }
        }

        self.edges.retain(|_, references| !references.is_empty());
        Step::Progress(resolved)
    }

    /// Every productive step removes at least one edge.
    fn iteration_limit(&self) -> usize {
        self.edge_count() + 1
    }

    /// Step until no edges remain. Fails when a step makes no progress or
    /// when `limit` steps were not enough.
    fn resolve_within(&mut self, context: &mut Context, limit: usize) -> Result<usize> {
        let mut iterations = 0;
        while !self.is_empty() {
            iterations += 1;
            if iterations > limit {
                return Err(Error::IterationLimit { limit });
            }

            match self.step(context) {
                Step::Progress(resolved) => {
                    tracing::trace!(iteration = iterations, resolved, "Resolved references");
                }
                Step::NoProgress => {
                    let keys = self.dependents();
                    tracing::debug!(?keys, "Reference resolution stuck");
                    return Err(Error::UnresolvableReference { keys });
                }
            }
        }
        Ok(iterations)
    }
}

/// Fixpoint substitution of `${key}` placeholders.
fn resolve_references(mut context: Context) -> Result<Context> {
    let mut graph = DependencyGraph::build(&context)?;
    if graph.is_empty() {
        return Ok(context);
    }

    let limit = graph.iteration_limit();
    let iterations = graph.resolve_within(&mut context, limit)?;

    // Substituted text can assemble a new token, e.g. "$" + "{x}".
    let leftover: Vec<String> = context
        .iter()
        .filter(|(_, value)| {
            let mut found = false;
            value.for_each_str(&mut |text: &str| {
                found |= placeholder::contains(text, PlaceholderKind::Reference);
            });
            found
        })
        .map(|(key, _)| key.clone())
        .collect();
    if !leftover.is_empty() {
        return Err(Error::UnresolvableReference { keys: leftover });
    }

    tracing::debug!(iterations, "Resolved configuration references");
    Ok(context)
}
