//! Document loading from files, strings and HTTP URLs.
//!
//! JSON and YAML documents are both parsed into a `serde_json::Value`,
//! keeping key order as written.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::LoadError;
use crate::refs::navigate_pointer;

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Serialization format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Guess the format from a path or URL: `.yaml`/`.yml` is YAML,
    /// anything else JSON.
    pub fn from_source(source: &str) -> Self {
        let source = source.split(['?', '#']).next().unwrap_or(source);
        if source.ends_with(".yaml") || source.ends_with(".yml") {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::Json
        }
    }
}

/// Load a document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or a parse error if the content isn't valid JSON/YAML.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_document_str(&content, DocumentFormat::from_source(&path.to_string_lossy()))
}

/// Load a document from a string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` or `LoadError::InvalidYaml`.
pub fn load_document_str(content: &str, format: DocumentFormat) -> Result<Value, LoadError> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })
        }
        DocumentFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml { source })
        }
    }
}

/// Load a document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails, or a parse
/// error if the body isn't valid JSON/YAML.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<Value, LoadError> {
    let network_error = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    // Check for HTTP errors before parsing
    let body = client
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(network_error)?;

    load_document_str(&body, DocumentFormat::from_source(url))
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a document from a file path or URL.
///
/// URL loading requires the `remote` feature.
pub fn load_document_auto(source: &str) -> Result<Value, LoadError> {
    if is_url(source) {
        #[cfg(feature = "remote")]
        {
            load_document_url(source)
        }
        #[cfg(not(feature = "remote"))]
        {
            Err(LoadError::FileNotFound {
                path: std::path::PathBuf::from(source),
            })
        }
    } else {
        load_document(Path::new(source))
    }
}

/// Inline external `$ref`s (`common.yaml#/components/schemas/Error`).
///
/// Local references (`#/...`) in the document itself are left for the
/// reference table. Local references inside a loaded external file are
/// resolved against that file. Keys written next to an external `$ref`
/// override the keys of the inlined target.
///
/// # Errors
///
/// Returns a load error for unreadable external files and
/// `LoadError::BundleError` for missing fragments or circular references.
pub fn bundle_refs(document: &mut Value, base_dir: &Path) -> Result<(), LoadError> {
    bundle_refs_inner(document, base_dir, None, &mut HashSet::new())
}

/// An external file whose local references are being resolved.
#[derive(Clone, Copy)]
struct FileRoot<'a> {
    path: &'a Path,
    document: &'a Value,
}

fn bundle_refs_inner(
    value: &mut Value,
    base_dir: &Path,
    file_root: Option<FileRoot<'_>>,
    visited: &mut HashSet<String>,
) -> Result<(), LoadError> {
    let reference = value
        .get("$ref")
        .and_then(Value::as_str)
        .map(str::to_string);

    if let Some(reference) = reference {
        let (file_part, fragment) = match reference.find('#') {
            Some(idx) => (&reference[..idx], &reference[idx..]),
            None => (reference.as_str(), "#"),
        };

        let target = if file_part.is_empty() {
            // No file_root = the document itself, leave for the reference table
            let Some(root) = file_root else {
                return Ok(());
            };
            let visit_key = format!("{}|{}", root.path.display(), fragment);
            enter(visited, &visit_key, &reference)?;
            let mut target = navigate_fragment(root.document, fragment)?;
            bundle_refs_inner(&mut target, base_dir, file_root, visited)?;
            visited.remove(&visit_key);
            target
        } else {
            let path = base_dir.join(file_part);
            let canonical = path.canonicalize().unwrap_or_else(|_| path.clone());
            let visit_key = format!("{}|{}", canonical.display(), fragment);
            enter(visited, &visit_key, &reference)?;

            let loaded = load_document(&path)?;
            debug!(path = %path.display(), fragment, "inlining external reference");
            let mut target = navigate_fragment(&loaded, fragment)?;
            let ref_dir = path.parent().unwrap_or(base_dir);
            let root = FileRoot {
                path: &canonical,
                document: &loaded,
            };
            bundle_refs_inner(&mut target, ref_dir, Some(root), visited)?;
            visited.remove(&visit_key);
            target
        };

        *value = inline_target(value, target);
        return Ok(());
    }

    match value {
        Value::Object(obj) => {
            for child in obj.values_mut() {
                bundle_refs_inner(child, base_dir, file_root, visited)?;
            }
        }
        Value::Array(arr) => {
            for item in arr {
                bundle_refs_inner(item, base_dir, file_root, visited)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn enter(visited: &mut HashSet<String>, visit_key: &str, reference: &str) -> Result<(), LoadError> {
    if visited.insert(visit_key.to_string()) {
        Ok(())
    } else {
        Err(LoadError::BundleError {
            message: format!("circular reference detected: {}", reference),
        })
    }
}

/// Navigate a fragment such as `#/components/schemas/Pet`.
fn navigate_fragment(document: &Value, fragment: &str) -> Result<Value, LoadError> {
    navigate_pointer(document, fragment.trim_start_matches('#'))
        .cloned()
        .ok_or_else(|| LoadError::BundleError {
            message: format!("fragment not found: {}", fragment),
        })
}

/// Replace a `$ref` object with its target, keeping sibling keys.
fn inline_target(reference_node: &Value, target: Value) -> Value {
    match (reference_node.as_object(), target) {
        (Some(siblings), Value::Object(mut inlined)) => {
            for (key, value) in siblings {
                if key != "$ref" {
                    inlined.insert(key.clone(), value.clone());
                }
            }
            Value::Object(inlined)
        }
        (_, target) => target,
    }
}
