//! Error types for document loading, schema resolution, assembly and rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Errors while loading an OpenAPI document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to bundle document: {message}")]
    BundleError { message: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors during schema resolution and example synthesis.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("unknown reference: {reference}")]
    UnknownReference { reference: String },

    #[error("cyclic schema: {reference} refers back to itself")]
    CyclicSchema { reference: String },
}

impl ResolveError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while assembling resources and endpoints from a document.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("operation {method} {path} must have a tag")]
    MissingTag { method: String, path: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl GenerateError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GenerateError::MissingTag { .. } => 2,
            GenerateError::Resolve(e) => e.exit_code(),
        }
    }
}

/// Errors while rendering or writing markdown output.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            RenderError::TemplateRead { .. } | RenderError::Write { .. } => 3,
            RenderError::Template(_) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("openapi.yaml"),
        };
        assert_eq!(err.exit_code(), 3);

        let err = LoadError::BundleError {
            message: "fragment not found".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn generate_error_exit_codes() {
        let err = GenerateError::MissingTag {
            method: "get".into(),
            path: "/pets".into(),
        };
        assert_eq!(err.exit_code(), 2);

        let err = GenerateError::from(ResolveError::UnknownReference {
            reference: "#/components/schemas/Missing".into(),
        });
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_tag_display() {
        let err = GenerateError::MissingTag {
            method: "post".into(),
            path: "/pets/{id}".into(),
        };
        assert_eq!(err.to_string(), "operation post /pets/{id} must have a tag");
    }

    #[test]
    fn cyclic_schema_display() {
        let err = ResolveError::CyclicSchema {
            reference: "#/components/schemas/Node".into(),
        };
        assert_eq!(
            err.to_string(),
            "cyclic schema: #/components/schemas/Node refers back to itself"
        );
    }
}
