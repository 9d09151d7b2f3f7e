//! Markdown rendering of resources and tag groups.
//!
//! Templates are `minijinja` templates. The built-in defaults can be
//! replaced per page kind with templates read from disk.

use std::io::Write;
use std::path::{Path, PathBuf};

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use tracing::info;

use crate::error::RenderError;
use crate::generate::{ApiDocs, Resource, TagGroup};

const DEFAULT_ENDPOINTS_TEMPLATE: &str = include_str!("../templates/endpoints.md.j2");
const DEFAULT_RESOURCE_TEMPLATE: &str = include_str!("../templates/resource.md.j2");

const ENDPOINTS: &str = "endpoints";
const RESOURCE: &str = "resource";

/// Where and how rendered pages are written.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Write one file per page here; stdout when unset.
    pub output_directory: Option<PathBuf>,
    /// Prepended to endpoint page file names.
    pub endpoints_prefix: Option<String>,
    /// Replaces the built-in endpoints template.
    pub endpoints_template: Option<PathBuf>,
    /// Replaces the built-in resource template.
    pub resource_template: Option<PathBuf>,
}

/// Template environment with the documentation filters registered.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Renderer using the built-in templates.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_templates(DEFAULT_ENDPOINTS_TEMPLATE, DEFAULT_RESOURCE_TEMPLATE)
    }

    /// Renderer using the templates configured in `options`, falling back
    /// to the built-in ones.
    pub fn from_options(options: &RenderOptions) -> Result<Self, RenderError> {
        let endpoints = match &options.endpoints_template {
            Some(path) => read_template(path)?,
            None => DEFAULT_ENDPOINTS_TEMPLATE.to_string(),
        };
        let resource = match &options.resource_template {
            Some(path) => read_template(path)?,
            None => DEFAULT_RESOURCE_TEMPLATE.to_string(),
        };
        Self::with_templates(endpoints, resource)
    }

    /// Renderer from template sources.
    pub fn with_templates(
        endpoints: impl Into<String>,
        resource: impl Into<String>,
    ) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        register_filters(&mut env);
        env.add_template_owned(ENDPOINTS, endpoints.into())?;
        env.add_template_owned(RESOURCE, resource.into())?;
        Ok(Self { env })
    }

    pub fn render_resource(&self, resource: &Resource) -> Result<String, RenderError> {
        Ok(self.env.get_template(RESOURCE)?.render(resource)?)
    }

    pub fn render_endpoints(&self, group: &TagGroup) -> Result<String, RenderError> {
        Ok(self.env.get_template(ENDPOINTS)?.render(group)?)
    }
}

/// Render every page and write it out.
///
/// With an output directory, resource pages are named after the resource
/// and endpoint pages after the tag (with the optional prefix); the written
/// paths are returned. Without one, pages are written to `out` in order.
pub fn write_docs<W: Write>(
    docs: &ApiDocs,
    renderer: &Renderer,
    options: &RenderOptions,
    out: &mut W,
) -> Result<Vec<PathBuf>, RenderError> {
    let mut written = Vec::new();

    for resource in &docs.resources {
        let page = renderer.render_resource(resource)?;
        let file_name = format!("{}.md", slugify(&resource.name));
        if let Some(path) = emit(&page, &file_name, options, out)? {
            info!(path = %path.display(), "resource saved");
            written.push(path);
        }
    }

    let prefix = options.endpoints_prefix.as_deref().unwrap_or("");
    for group in &docs.groups {
        let page = renderer.render_endpoints(group)?;
        let file_name = format!("{}{}.md", prefix, slugify(&group.tag.name));
        if let Some(path) = emit(&page, &file_name, options, out)? {
            info!(path = %path.display(), "endpoint saved");
            written.push(path);
        }
    }

    Ok(written)
}

/// File-name slug: keeps ASCII alphanumerics and `_`, turns each run of
/// spaces into a single `-`, lowercases.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars() {
        if c == ' ' {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c.to_ascii_lowercase());
            in_space = false;
        }
    }
    slug
}

/// Last path segment of a reference: `#/components/schemas/Pet` -> `Pet`.
pub fn ref_to_resource_name(reference: &str) -> Option<&str> {
    reference.rsplit('/').next().filter(|name| !name.is_empty())
}

/// Link to the page of the referenced resource.
pub fn ref_to_resource_link(reference: &str) -> Option<String> {
    ref_to_resource_name(reference).map(|name| format!("{}.html", slugify(name)))
}

// --- Internal implementation ---

fn register_filters(env: &mut Environment<'static>) {
    env.add_filter("breaklines", |text: Option<String>| {
        text.map(|t| t.replace("\r\n", "<br>").replace(['\n', '\r'], "<br>"))
            .unwrap_or_default()
    });
    env.add_filter("uppercase", |text: String| text.to_uppercase());
    env.add_filter("json", to_pretty_json);
    env.add_filter("ref_to_resource_name", |reference: Option<String>| {
        reference
            .as_deref()
            .and_then(ref_to_resource_name)
            .unwrap_or_default()
            .to_string()
    });
    env.add_filter("ref_to_resource_link", |reference: Option<String>| {
        reference
            .as_deref()
            .and_then(ref_to_resource_link)
            .unwrap_or_default()
    });
}

/// Pretty JSON with a four-space indent.
fn to_pretty_json(value: minijinja::Value) -> Result<String, minijinja::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer).map_err(|e| {
        minijinja::Error::new(minijinja::ErrorKind::BadSerialization, e.to_string())
    })?;
    String::from_utf8(buf).map_err(|e| {
        minijinja::Error::new(minijinja::ErrorKind::BadSerialization, e.to_string())
    })
}

fn read_template(path: &Path) -> Result<String, RenderError> {
    std::fs::read_to_string(path).map_err(|source| RenderError::TemplateRead {
        path: path.to_path_buf(),
        source,
    })
}

fn emit<W: Write>(
    page: &str,
    file_name: &str,
    options: &RenderOptions,
    out: &mut W,
) -> Result<Option<PathBuf>, RenderError> {
    match &options.output_directory {
        Some(dir) => {
            let path = dir.join(file_name);
            std::fs::write(&path, page).map_err(|source| RenderError::Write {
                path: path.clone(),
                source,
            })?;
            Ok(Some(path))
        }
        None => {
            writeln!(out, "{}", page).map_err(|source| RenderError::Write {
                path: PathBuf::from("<stdout>"),
                source,
            })?;
            Ok(None)
        }
    }
}
