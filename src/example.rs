//! Example synthesis - builds one plain JSON instance of a schema.
//!
//! Examples are deterministic: scalars become their type name
//! (`"string"`, `"number"`, ...), arrays hold exactly one element and
//! `oneOf` picks the first alternative. A literal `example` anywhere in
//! the tree takes precedence over synthesis.

use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::refs::ReferenceTable;
use crate::resolver::{merge_schema_objects, without_key};
use crate::types::{reference_of, SchemaKind};

/// Build an example value for a schema node.
///
/// Returns `Ok(None)` when no example can be derived (no recognized type
/// and no composition). References are followed at any depth; there is
/// no depth cutoff here, an example is always complete.
///
/// # Errors
///
/// Returns `ResolveError::UnknownReference` for a reference missing from
/// `refs`, and `ResolveError::CyclicSchema` when a reference is reached
/// again while it is still being expanded.
pub fn build_example<R>(node: &Value, refs: &R) -> Result<Option<Value>, ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    let mut expanding = Vec::new();
    synthesize(node, refs, &mut expanding)
}

fn synthesize<R>(
    node: &Value,
    refs: &R,
    expanding: &mut Vec<String>,
) -> Result<Option<Value>, ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    if let Some(example) = node.get("example") {
        return Ok(Some(example.clone()));
    }

    match SchemaKind::classify(node) {
        SchemaKind::Reference(reference) => {
            if expanding.iter().any(|r| r == reference) {
                return Err(ResolveError::CyclicSchema {
                    reference: reference.to_string(),
                });
            }
            let target = refs.fetch(reference)?;
            expanding.push(reference.to_string());
            let example = synthesize(target, refs, expanding);
            expanding.pop();
            example
        }
        SchemaKind::AllOf(_) => {
            let mut operands = Vec::new();
            flatten_all_of(node, refs, expanding, &mut operands)?;
            synthesize(&merge_schema_objects(&operands), refs, expanding)
        }
        // for simplicity, pick the first
        SchemaKind::OneOf(branches) => match branches.first() {
            Some(first) => synthesize(first, refs, expanding),
            None => Ok(None),
        },
        SchemaKind::Object {
            properties,
            additional_properties,
        } => {
            let mut example = Map::new();
            for (name, property) in properties.into_iter().flatten() {
                if let Some(value) = synthesize(property, refs, expanding)? {
                    example.insert(name.clone(), value);
                }
            }
            if additional_properties.is_some_and(is_truthy) {
                // Fixed stand-in, whatever the additionalProperties schema says
                example.insert("property1".to_string(), Value::from("string"));
                example.insert("property2".to_string(), Value::from("number"));
            }
            Ok(Some(Value::Object(example)))
        }
        SchemaKind::Array { items } => {
            let item = match items {
                Some(items) => synthesize(items, refs, expanding)?,
                None => None,
            };
            Ok(Some(Value::Array(vec![item.unwrap_or(Value::Null)])))
        }
        SchemaKind::Scalar(scalar) => Ok(Some(Value::from(scalar.as_str()))),
        SchemaKind::Untyped => Ok(None),
    }
}

/// Collect the operands of an `allOf` for a schema merge: the node's own
/// keys first, then every branch with references followed and nested
/// `allOf` lists flattened in place.
///
/// References followed along one branch are pushed onto `expanding` while
/// that branch is flattened, and popped afterwards.
fn flatten_all_of<'a, R>(
    node: &'a Value,
    refs: &'a R,
    expanding: &mut Vec<String>,
    operands: &mut Vec<Value>,
) -> Result<(), ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    operands.push(without_key(node, "allOf"));
    let Some(branches) = node.get("allOf").and_then(Value::as_array) else {
        return Ok(());
    };

    for branch in branches {
        let mark = expanding.len();
        let result = flatten_branch(branch, refs, expanding, operands);
        expanding.truncate(mark);
        result?;
    }
    Ok(())
}

fn flatten_branch<'a, R>(
    branch: &'a Value,
    refs: &'a R,
    expanding: &mut Vec<String>,
    operands: &mut Vec<Value>,
) -> Result<(), ResolveError>
where
    R: ReferenceTable + ?Sized,
{
    let mut branch = branch;
    while let Some(reference) = reference_of(branch) {
        if expanding.iter().any(|r| r == reference) {
            return Err(ResolveError::CyclicSchema {
                reference: reference.to_string(),
            });
        }
        expanding.push(reference.to_string());
        branch = refs.fetch(reference)?;
    }

    match SchemaKind::classify(branch) {
        SchemaKind::AllOf(_) => flatten_all_of(branch, refs, expanding, operands),
        _ => {
            operands.push(branch.clone());
            Ok(())
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
