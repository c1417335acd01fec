//! Handlebars rendering of resolved contexts

use crate::tree::template_data;
use crate::{Error, Result};
use conf_core::Context;
use conf_fs::io::read_text;
use conf_fs::{TemplateFile, discover_templates};
use handlebars::Handlebars;
use indexmap::IndexMap;
use std::path::Path;

/// A set of registered templates and the outputs they produce.
pub struct Renderer {
    handlebars: Handlebars<'static>,
    templates: Vec<TemplateFile>,
}

impl Renderer {
    /// A renderer with no templates.
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.register_helper("uppercase", Box::new(uppercase_helper));
        handlebars.register_helper("lowercase", Box::new(lowercase_helper));
        handlebars.register_helper("json", Box::new(json_helper));

        Self {
            handlebars,
            templates: Vec::new(),
        }
    }

    /// Register every template below `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut renderer = Self::new();
        for template in discover_templates(dir)? {
            let source = read_text(&template.source)?;
            renderer.register(template, &source)?;
        }
        tracing::debug!(
            dir = %dir.display(),
            count = renderer.templates.len(),
            "Registered templates"
        );
        Ok(renderer)
    }

    /// Register a template from source text.
    pub fn register_template(&mut self, name: &str, output: &str, source: &str) -> Result<()> {
        let template = TemplateFile {
            source: name.into(),
            name: name.to_string(),
            output: output.to_string(),
        };
        self.register(template, source)
    }

    fn register(&mut self, template: TemplateFile, source: &str) -> Result<()> {
        self.handlebars
            .register_template_string(&template.name, source)
            .map_err(|source| Error::Template {
                name: template.name.clone(),
                source,
            })?;
        self.templates.retain(|t| t.name != template.name);
        self.templates.push(template);
        Ok(())
    }

    pub fn templates(&self) -> &[TemplateFile] {
        &self.templates
    }

    /// Render a single registered template.
    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        if !self.handlebars.has_template(name) {
            return Err(Error::UnknownTemplate {
                name: name.to_string(),
            });
        }
        self.render_data(name, &template_data(context))
    }

    /// Render every template. Keys are output paths relative to the output
    /// directory, in registration order.
    pub fn render_all(&self, context: &Context) -> Result<IndexMap<String, String>> {
        let data = template_data(context);
        self.templates
            .iter()
            .map(|template| {
                let content = self.render_data(&template.name, &data)?;
                Ok((template.output.clone(), content))
            })
            .collect()
    }

    fn render_data(&self, name: &str, data: &serde_json::Value) -> Result<String> {
        self.handlebars
            .render(name, data)
            .map_err(|source| Error::Render {
                name: name.to_string(),
                source,
            })
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn uppercase_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    out.write(&param_text(h).to_uppercase())?;
    Ok(())
}

fn lowercase_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    out.write(&param_text(h).to_lowercase())?;
    Ok(())
}

/// String form of the first parameter: strings as-is, missing or null as
/// empty, anything else as JSON text.
fn param_text(h: &handlebars::Helper) -> String {
    match h.param(0).map(|v| v.value()) {
        Some(serde_json::Value::String(s)) => s.clone(),
        None | Some(serde_json::Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}

fn json_helper(
    h: &handlebars::Helper,
    _: &Handlebars,
    _: &handlebars::Context,
    _: &mut handlebars::RenderContext,
    out: &mut dyn handlebars::Output,
) -> handlebars::HelperResult {
    if let Some(v) = h.param(0) {
        out.write(&serde_json::to_string(v.value()).unwrap_or_default())?;
    }
    Ok(())
}
