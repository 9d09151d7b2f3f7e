//! Resource and endpoint assembly.
//!
//! Runs the resolver and the example synthesizer once per named schema in
//! `components.schemas` and once per operation request/response body, and
//! groups the resulting endpoints by tag for rendering.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{GenerateError, ResolveError};
use crate::example::build_example;
use crate::refs::ReferenceTable;
use crate::resolver::resolve;
use crate::types::{reference_of, ResolveOptions, JSON_CONTENT_TYPE, METHODS};

/// Depth cutoffs for the two kinds of generated pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Cutoff for schemas listed under `components.schemas`.
    pub resource_schema_depth: Option<usize>,
    /// Cutoff for request and response bodies.
    pub endpoint_schema_depth: Option<usize>,
}

impl GenerateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource_schema_depth(mut self, depth: Option<usize>) -> Self {
        self.resource_schema_depth = depth;
        self
    }

    pub fn endpoint_schema_depth(mut self, depth: Option<usize>) -> Self {
        self.endpoint_schema_depth = depth;
        self
    }

    fn resources(&self) -> ResolveOptions {
        ResolveOptions::new().max_depth(self.resource_schema_depth)
    }

    fn endpoints(&self) -> ResolveOptions {
        ResolveOptions::new().max_depth(self.endpoint_schema_depth)
    }
}

/// A named reusable schema: `{name, ...resolved schema, example}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub name: String,
    pub schema: Value,
    pub example: Option<Value>,
}

impl Resource {
    /// Flatten into the record handed to templates.
    pub fn to_value(&self) -> Value {
        let mut record = Map::new();
        record.insert("name".to_string(), Value::String(self.name.clone()));
        if let Value::Object(schema) = &self.schema {
            for (key, value) in schema {
                record.insert(key.clone(), value.clone());
            }
        }
        if let Some(example) = &self.example {
            record.insert("example".to_string(), example.clone());
        }
        Value::Object(record)
    }
}

impl Serialize for Resource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Documentation for one response status code.
///
/// Without a JSON body only `description` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// The JSON request body of an operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
    pub schema: Option<Value>,
    pub example: Option<Value>,
    /// Set when the body schema is a bare `$ref`.
    pub reference: Option<String>,
}

/// One operation (method + path) as consumed by the endpoints template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub method: String,
    pub path: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body_example: Option<Value>,
    pub path_parameters: Vec<Value>,
    pub query_parameters: Vec<Value>,
    pub responses: IndexMap<String, ResponseSchema>,
}

/// Name and description of a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// All endpoints carrying one tag; the context of one endpoints page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagGroup {
    pub tag: TagInfo,
    pub endpoints: Vec<Endpoint>,
}

/// Everything generated from one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiDocs {
    pub resources: Vec<Resource>,
    pub groups: Vec<TagGroup>,
}

/// Generate resources and tag-grouped endpoints for a whole document.
pub fn generate<R>(
    document: &Value,
    refs: &R,
    options: &GenerateOptions,
) -> Result<ApiDocs, GenerateError>
where
    R: ReferenceTable + ?Sized,
{
    let resources = generate_resources(document, refs, options)?;
    let endpoints = generate_endpoints(document, refs, options)?;
    let groups = group_endpoints_by_tag(document, &endpoints);
    Ok(ApiDocs { resources, groups })
}

/// Build one resource per `components.schemas` entry, sorted by name.
pub fn generate_resources<R>(
    document: &Value,
    refs: &R,
    options: &GenerateOptions,
) -> Result<Vec<Resource>, ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    let Some(schemas) = document
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
    else {
        return Ok(Vec::new());
    };

    let mut named: Vec<(&String, &Value)> = schemas.iter().collect();
    named.sort_by(|(a, _), (b, _)| a.cmp(b));

    let options = options.resources();
    named
        .into_iter()
        .map(|(name, schema)| generate_resource(name, schema, refs, &options))
        .collect()
}

/// Resolve one named schema and synthesize its example.
pub fn generate_resource<R>(
    name: &str,
    schema: &Value,
    refs: &R,
    options: &ResolveOptions,
) -> Result<Resource, ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    Ok(Resource {
        name: name.to_string(),
        schema: resolve(schema, refs, options)?,
        example: build_example(schema, refs)?,
    })
}

/// Extract every operation of the document, paths in document order and
/// methods in [`METHODS`] order.
pub fn generate_endpoints<R>(
    document: &Value,
    refs: &R,
    options: &GenerateOptions,
) -> Result<Vec<Endpoint>, GenerateError>
where
    R: ReferenceTable + ?Sized,
{
    let Some(paths) = document.get("paths").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    let options = options.endpoints();
    let mut endpoints = Vec::new();
    for (path, path_item) in paths {
        let path_item = refs.follow(path_item)?;
        for method in METHODS {
            if let Some(operation) = path_item.get(*method) {
                endpoints.push(generate_endpoint(method, path, operation, refs, &options)?);
            }
        }
    }
    Ok(endpoints)
}

/// Build one endpoint from an operation object.
///
/// # Errors
///
/// Returns `GenerateError::MissingTag` when the operation has no `tags`.
pub fn generate_endpoint<R>(
    method: &str,
    path: &str,
    operation: &Value,
    refs: &R,
    options: &ResolveOptions,
) -> Result<Endpoint, GenerateError>
where
    R: ReferenceTable + ?Sized,
{
    let tags = operation
        .get("tags")
        .and_then(Value::as_array)
        .ok_or_else(|| GenerateError::MissingTag {
            method: method.to_string(),
            path: path.to_string(),
        })?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();

    let request_body = request_body_objects(operation, refs, options)?;

    Ok(Endpoint {
        method: method.to_string(),
        path: path.to_string(),
        tags,
        summary: string_field(operation, "summary"),
        description: string_field(operation, "description"),
        request_body_schema: request_body.schema,
        request_body_ref: request_body.reference,
        request_body_example: request_body.example,
        path_parameters: parameters_in(operation, "path"),
        query_parameters: parameters_in(operation, "query"),
        responses: response_objects(operation, refs, options)?,
    })
}

/// Resolve the `application/json` request body of an operation.
///
/// Operations without a request body, or whose body has no JSON content,
/// yield an empty [`RequestBody`].
pub fn request_body_objects<R>(
    operation: &Value,
    refs: &R,
    options: &ResolveOptions,
) -> Result<RequestBody, ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    let Some(request_body) = operation.get("requestBody") else {
        return Ok(RequestBody::default());
    };
    let request_body = refs.follow(request_body)?;

    let Some(schema) = json_schema(request_body) else {
        debug!("request body has no {} schema, skipping", JSON_CONTENT_TYPE);
        return Ok(RequestBody::default());
    };

    Ok(RequestBody {
        schema: Some(resolve(schema, refs, options)?),
        example: build_example(schema, refs)?,
        reference: reference_of(schema).map(str::to_string),
    })
}

/// Resolve every declared response of an operation, keyed by status code
/// in declaration order.
pub fn response_objects<R>(
    operation: &Value,
    refs: &R,
    options: &ResolveOptions,
) -> Result<IndexMap<String, ResponseSchema>, ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    let mut responses = IndexMap::new();
    if let Some(declared) = operation.get("responses").and_then(Value::as_object) {
        for (status, response) in declared {
            responses.insert(status.clone(), response_object(response, refs, options)?);
        }
    }
    Ok(responses)
}

/// Resolve a single response object.
pub fn response_object<R>(
    response: &Value,
    refs: &R,
    options: &ResolveOptions,
) -> Result<ResponseSchema, ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    let response = refs.follow(response)?;
    let description = string_field(response, "description");

    let Some(schema) = json_schema(response) else {
        return Ok(ResponseSchema {
            description,
            ..ResponseSchema::default()
        });
    };

    Ok(ResponseSchema {
        description,
        schema: Some(resolve(schema, refs, options)?),
        example: build_example(schema, refs)?,
        reference: reference_of(schema).map(str::to_string),
    })
}

/// Split endpoints into one group per tag, in order of first appearance.
///
/// An endpoint with several tags appears in each of their groups, carrying
/// only that group's tag.
pub fn group_endpoints_by_tag(document: &Value, endpoints: &[Endpoint]) -> Vec<TagGroup> {
    let mut groups: Vec<TagGroup> = Vec::new();

    for endpoint in endpoints {
        for tag in &endpoint.tags {
            let denormalized = Endpoint {
                tags: vec![tag.clone()],
                ..endpoint.clone()
            };
            match groups.iter_mut().find(|group| group.tag.name == *tag) {
                Some(group) => group.endpoints.push(denormalized),
                None => groups.push(TagGroup {
                    tag: TagInfo {
                        name: tag.clone(),
                        description: tag_description(document, tag),
                    },
                    endpoints: vec![denormalized],
                }),
            }
        }
    }

    groups
}

// --- Internal implementation ---

/// The schema of the `application/json` content entry, if any.
fn json_schema(container: &Value) -> Option<&Value> {
    container
        .get("content")?
        .get(JSON_CONTENT_TYPE)?
        .get("schema")
}

fn parameters_in(operation: &Value, location: &str) -> Vec<Value> {
    operation
        .get("parameters")
        .and_then(Value::as_array)
        .map(|parameters| {
            parameters
                .iter()
                .filter(|p| p.get("in").and_then(Value::as_str) == Some(location))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

fn tag_description(document: &Value, name: &str) -> Option<String> {
    document
        .get("tags")?
        .as_array()?
        .iter()
        .find(|tag| tag.get("name").and_then(Value::as_str) == Some(name))
        .and_then(|tag| string_field(tag, "description"))
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}
