//! OpenAPI Markdown
//!
//! Reference resolution, example synthesis and markdown rendering for
//! OpenAPI 3 documents.
//!
//! The resolver expands `$ref`, `allOf`, `oneOf`, object properties and
//! array items up to an optional depth; the example synthesizer builds one
//! deterministic JSON instance per schema. Both feed the markdown pages
//! rendered for every named resource and every tag.
//!
//! # Example
//!
//! ```
//! use openapi_markdown::{build_example, resolve, DocumentRefs, ResolveOptions};
//! use serde_json::json;
//!
//! let document = json!({
//!     "components": {
//!         "schemas": {
//!             "Pet": {
//!                 "type": "object",
//!                 "properties": {
//!                     "id": { "type": "integer" },
//!                     "name": { "type": "string", "example": "Rex" }
//!                 }
//!             }
//!         }
//!     }
//! });
//! let refs = DocumentRefs::new(&document);
//! let node = json!({ "$ref": "#/components/schemas/Pet" });
//!
//! let resolved = resolve(&node, &refs, &ResolveOptions::new()).unwrap();
//! assert_eq!(resolved["ref"], "#/components/schemas/Pet");
//! assert_eq!(resolved["properties"]["id"]["type"], "integer");
//!
//! let example = build_example(&node, &refs).unwrap();
//! assert_eq!(example, Some(json!({ "id": "integer", "name": "Rex" })));
//! ```
//!
//! # Depth
//!
//! | Construct | Branches resolved at |
//! |-----------|----------------------|
//! | `allOf` | depth + 1 |
//! | `oneOf` | same depth |
//! | object `properties` | depth + 1 |
//! | array `items` | depth + 1 |
//!
//! A node reached at the cutoff is returned as-is, references included.

mod error;
mod example;
mod generate;
mod loader;
mod refs;
mod render;
mod resolver;
mod types;

pub use error::{GenerateError, LoadError, RenderError, ResolveError};
pub use example::build_example;
pub use generate::{
    generate, generate_endpoint, generate_endpoints, generate_resource, generate_resources,
    group_endpoints_by_tag, request_body_objects, response_object, response_objects, ApiDocs,
    Endpoint, GenerateOptions, RequestBody, Resource, ResponseSchema, TagGroup, TagInfo,
};
pub use loader::{
    bundle_refs, is_url, load_document, load_document_auto, load_document_str, DocumentFormat,
};
pub use refs::{navigate_pointer, DocumentRefs, ReferenceTable};
pub use render::{
    ref_to_resource_link, ref_to_resource_name, slugify, write_docs, RenderOptions, Renderer,
};
pub use resolver::{dereference, merge_schema_objects, resolve, resolve_at};
pub use types::{ResolveOptions, ScalarType, SchemaKind, JSON_CONTENT_TYPE, METHODS};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
