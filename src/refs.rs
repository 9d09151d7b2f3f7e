//! Reference tables: look up the schema a `$ref` string denotes.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::ResolveError;
use crate::types::reference_of;

/// Read-only lookup from a reference string to the node it denotes.
///
/// The resolver and synthesizer never mutate what a table returns; they
/// deep-copy targets before changing them.
pub trait ReferenceTable {
    /// Returns the node `reference` points to, or `None` if it is unknown.
    fn lookup(&self, reference: &str) -> Option<&Value>;

    /// Like [`lookup`](Self::lookup), failing with
    /// [`ResolveError::UnknownReference`].
    fn fetch(&self, reference: &str) -> Result<&Value, ResolveError> {
        self.lookup(reference)
            .ok_or_else(|| ResolveError::UnknownReference {
                reference: reference.to_string(),
            })
    }

    /// Follow a chain of bare references starting at `node`.
    ///
    /// Returns `node` itself when it is not a reference, otherwise the
    /// first target that is not a reference.
    fn follow<'a>(&'a self, node: &'a Value) -> Result<&'a Value, ResolveError> {
        let mut current = node;
        let mut seen: Vec<&str> = Vec::new();
        while let Some(reference) = reference_of(current) {
            if seen.contains(&reference) {
                return Err(ResolveError::CyclicSchema {
                    reference: reference.to_string(),
                });
            }
            seen.push(reference);
            current = self.fetch(reference)?;
        }
        Ok(current)
    }
}

/// Resolves local JSON Pointer references (`#/components/schemas/Pet`)
/// against a loaded document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentRefs<'a> {
    document: &'a Value,
}

impl<'a> DocumentRefs<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &'a Value {
        self.document
    }
}

impl ReferenceTable for DocumentRefs<'_> {
    fn lookup(&self, reference: &str) -> Option<&Value> {
        let pointer = reference.strip_prefix('#')?;
        navigate_pointer(self.document, pointer)
    }
}

impl ReferenceTable for HashMap<String, Value> {
    fn lookup(&self, reference: &str) -> Option<&Value> {
        self.get(reference)
    }
}

impl ReferenceTable for Map<String, Value> {
    fn lookup(&self, reference: &str) -> Option<&Value> {
        self.get(reference)
    }
}

/// Navigate a JSON Pointer (e.g. `/$defs/foo`) without the leading `#`.
///
/// An empty pointer denotes the whole document. Array segments are
/// interpreted as indices.
pub fn navigate_pointer<'v>(document: &'v Value, pointer: &str) -> Option<&'v Value> {
    let path = pointer.trim_start_matches('/');
    if path.is_empty() {
        return Some(document);
    }

    let mut current = document;
    for part in path.split('/') {
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        let key = part.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&key)?,
            Value::Array(arr) => arr.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
