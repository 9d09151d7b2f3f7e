//! Schema resolution - dereferences `$ref`s and normalizes `allOf`/`oneOf`
//! into a self-contained schema tree for rendering.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ResolveError;
use crate::refs::ReferenceTable;
use crate::types::{reference_of, ResolveOptions, SchemaKind};

/// Resolve a schema node into a documentation-ready tree.
///
/// References are replaced by a deep copy of their target, tagged with the
/// original reference string under `ref`. `allOf` branches are merged into
/// one schema, every `oneOf` alternative is resolved in place. Expansion
/// stops at `options.max_depth`; nodes at the cutoff are copied verbatim,
/// so a reference sitting exactly at the cutoff stays a bare `$ref`.
///
/// # Errors
///
/// Returns `ResolveError::UnknownReference` if a reference cannot be found
/// in `refs`, or `ResolveError::CyclicSchema` for a reference that aliases
/// itself.
pub fn resolve<R>(node: &Value, refs: &R, options: &ResolveOptions) -> Result<Value, ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    resolve_at(node, refs, options, 0)
}

/// Resolve a schema node as if it sat `depth` levels below the root.
///
/// Each property and array item is one level deeper than its parent, as is
/// each `allOf` branch. `oneOf` alternatives and dereferencing do not
/// consume depth.
pub fn resolve_at<R>(
    node: &Value,
    refs: &R,
    options: &ResolveOptions,
    depth: usize,
) -> Result<Value, ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    if options.max_depth == Some(depth) {
        return Ok(node.clone());
    }

    let mut resolved = dereference(node, refs)?;

    match SchemaKind::classify(&resolved) {
        SchemaKind::AllOf(branches) => {
            let mut operands = Vec::with_capacity(branches.len() + 1);
            operands.push(without_key(&resolved, "allOf"));
            for branch in branches {
                operands.push(resolve_at(branch, refs, options, depth + 1)?);
            }
            return Ok(merge_schema_objects(&operands));
        }
        SchemaKind::OneOf(branches) => {
            let branches = branches
                .iter()
                .map(|branch| resolve_at(branch, refs, options, depth))
                .collect::<Result<Vec<_>, _>>()?;
            replace_key(&mut resolved, "oneOf", Value::Array(branches));
        }
        SchemaKind::Object {
            properties: Some(properties),
            ..
        } => {
            let properties = resolve_properties(properties, refs, options, depth + 1)?;
            replace_key(&mut resolved, "properties", Value::Object(properties));
        }
        SchemaKind::Array { items: Some(items) } => {
            let items = resolve_at(items, refs, options, depth + 1)?;
            replace_key(&mut resolved, "items", items);
        }
        // NOTE: anyOf is not resolved
        _ => {}
    }

    Ok(resolved)
}

/// Merge schema objects left to right.
///
/// No resolution happens here: the operands are merged as given.
/// Top-level keys are overwritten by later operands, `properties` maps are
/// unioned (later operand wins per key) and `required` lists are
/// concatenated. Duplicate `required` names are kept.
///
/// The result always carries `properties` and `required`, even when no
/// operand declares them.
pub fn merge_schema_objects<'a, I>(operands: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut initial = Map::new();
    initial.insert("properties".to_string(), Value::Object(Map::new()));
    initial.insert("required".to_string(), Value::Array(Vec::new()));

    Value::Object(operands.into_iter().fold(initial, merge_pair))
}

/// Dereference a node one step without consuming depth.
///
/// Returns a deep copy of either the node itself or its reference target.
/// A target that is itself a bare reference is followed; the `ref` tag
/// keeps the reference the caller wrote.
pub fn dereference<R>(node: &Value, refs: &R) -> Result<Value, ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    let Some(reference) = reference_of(node) else {
        return Ok(node.clone());
    };

    // Alias chains (`#/A` -> `{$ref: #/B}` -> schema) are followed to the
    // first non-reference target in one step; the tag is the outermost ref.
    let target = refs.follow(node)?;
    debug!(reference, "dereferenced schema");
    Ok(tag_reference(target, reference))
}

// --- Internal implementation ---

fn resolve_properties<R>(
    properties: &Map<String, Value>,
    refs: &R,
    options: &ResolveOptions,
    depth: usize,
) -> Result<Map<String, Value>, ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    let mut result = Map::new();
    for (name, property) in properties {
        result.insert(name.clone(), resolve_at(property, refs, options, depth)?);
    }
    Ok(result)
}

fn merge_pair(mut merged: Map<String, Value>, operand: &Value) -> Map<String, Value> {
    let Some(operand) = operand.as_object() else {
        return merged;
    };

    // Take the accumulated lists out in place so their keys keep position
    let mut properties = merged
        .get_mut("properties")
        .and_then(Value::as_object_mut)
        .map(std::mem::take)
        .unwrap_or_default();
    let mut required = merged
        .get_mut("required")
        .and_then(Value::as_array_mut)
        .map(std::mem::take)
        .unwrap_or_default();

    for (key, value) in operand {
        match key.as_str() {
            "properties" => {
                if let Some(props) = value.as_object() {
                    for (name, prop) in props {
                        properties.insert(name.clone(), prop.clone());
                    }
                }
            }
            "required" => {
                if let Some(names) = value.as_array() {
                    required.extend(names.iter().cloned());
                }
            }
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }

    merged.insert("properties".to_string(), Value::Object(properties));
    merged.insert("required".to_string(), Value::Array(required));
    merged
}

fn tag_reference(target: &Value, reference: &str) -> Value {
    match target {
        Value::Object(map) => {
            let mut tagged = map.clone();
            tagged.insert("ref".to_string(), Value::String(reference.to_string()));
            Value::Object(tagged)
        }
        other => other.clone(),
    }
}

/// Copy of an object node without `key`, keeping the order of the rest.
pub(crate) fn without_key(node: &Value, key: &str) -> Value {
    match node {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn replace_key(node: &mut Value, key: &str, value: Value) {
    if let Value::Object(map) = node {
        map.insert(key.to_string(), value);
    }
}
