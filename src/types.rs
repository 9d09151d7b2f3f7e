//! Core types for schema resolution and example synthesis.

use serde_json::{Map, Value};

/// The only media type whose schemas are documented.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP methods scanned for operations, in output order.
pub const METHODS: &[&str] = &["get", "put", "patch", "delete", "post"];

/// Leaf schema types that synthesize to a placeholder string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Boolean,
    Number,
    String,
    Integer,
}

impl ScalarType {
    /// Parse a `type` tag. `null` and container types are not scalars here.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "boolean" => Some(ScalarType::Boolean),
            "number" => Some(ScalarType::Number),
            "string" => Some(ScalarType::String),
            "integer" => Some(ScalarType::Integer),
            _ => None,
        }
    }

    /// The type name, also used as the placeholder example value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::Boolean => "boolean",
            ScalarType::Number => "number",
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
        }
    }
}

/// Structural view of a schema node.
///
/// Variants are checked in declaration order: a node carrying both `$ref`
/// and `allOf` is a `Reference`, a node carrying both `allOf` and `oneOf`
/// is `AllOf`, and so on. The view borrows from the node; all other keys
/// stay in the underlying map untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaKind<'a> {
    /// `{"$ref": "..."}`.
    Reference(&'a str),
    /// Has an `allOf` list.
    AllOf(&'a [Value]),
    /// Has a `oneOf` list.
    OneOf(&'a [Value]),
    /// `type: object`.
    Object {
        properties: Option<&'a Map<String, Value>>,
        additional_properties: Option<&'a Value>,
    },
    /// `type: array`.
    Array { items: Option<&'a Value> },
    /// `type` is one of boolean, number, string or integer.
    Scalar(ScalarType),
    /// Anything else: `type: null`, no type at all, or a non-object node.
    Untyped,
}

impl<'a> SchemaKind<'a> {
    /// Classify a schema node.
    pub fn classify(node: &'a Value) -> Self {
        let Some(map) = node.as_object() else {
            return SchemaKind::Untyped;
        };

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            return SchemaKind::Reference(reference);
        }
        if let Some(branches) = map.get("allOf").and_then(Value::as_array) {
            return SchemaKind::AllOf(branches);
        }
        if let Some(branches) = map.get("oneOf").and_then(Value::as_array) {
            return SchemaKind::OneOf(branches);
        }

        match map.get("type").and_then(Value::as_str) {
            Some("object") => SchemaKind::Object {
                properties: map.get("properties").and_then(Value::as_object),
                additional_properties: map.get("additionalProperties"),
            },
            Some("array") => SchemaKind::Array {
                items: map.get("items"),
            },
            Some(other) => ScalarType::parse(other)
                .map(SchemaKind::Scalar)
                .unwrap_or(SchemaKind::Untyped),
            None => SchemaKind::Untyped,
        }
    }
}

/// Returns the `$ref` string when the node is a bare reference.
pub fn reference_of(node: &Value) -> Option<&str> {
    match SchemaKind::classify(node) {
        SchemaKind::Reference(reference) => Some(reference),
        _ => None,
    }
}

/// Options for schema resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Depth at which expansion stops and nodes are copied verbatim.
    /// `None` expands the whole tree.
    pub max_depth: Option<usize>,
}

impl ResolveOptions {
    /// Create options with unbounded depth.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the depth cutoff.
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}
