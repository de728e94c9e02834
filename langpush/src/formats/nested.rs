//! Conversion between flat `a.b.c` terms and nested key trees.
//!
//! Shared by the nested JSON and YAML formats. Trees are `serde_json` maps,
//! which keep insertion order.

use serde_json::{Map, Value};

use crate::types::{TranslationDocument, TranslationRecord};

/// Separator between path segments of a term.
pub const KEY_DELIMITER: char = '.';

/// Builds a flat object keyed by term.
pub fn flat_tree(document: &TranslationDocument) -> Map<String, Value> {
    document
        .translations
        .iter()
        .map(|r| (r.term.clone(), Value::String(r.translation.clone())))
        .collect()
}

/// Builds a nested object, splitting every term on [`KEY_DELIMITER`].
///
/// Records are inserted in document order. When a segment already holds a
/// string, the remaining path starting at that segment is stored as one
/// literal key at that level, so `a` followed by `a.b.c` gives
/// `{"a": ..., "a.b.c": ...}`. When a string lands on an existing object it
/// is stored under that object's empty key.
pub fn nest(document: &TranslationDocument) -> Map<String, Value> {
    let mut root = Map::new();
    for record in &document.translations {
        let segments: Vec<&str> = record.term.split(KEY_DELIMITER).collect();
        insert(&mut root, &segments, &record.translation);
    }
    root
}

fn insert(map: &mut Map<String, Value>, segments: &[&str], value: &str) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };

    if rest.is_empty() {
        match map.get_mut(*head) {
            Some(Value::Object(child)) => {
                child.insert(String::new(), Value::String(value.to_string()));
            }
            _ => {
                map.insert(head.to_string(), Value::String(value.to_string()));
            }
        }
        return;
    }

    match map.get_mut(*head) {
        Some(Value::Object(child)) => insert(child, rest, value),
        Some(_) => {
            let literal = segments.join(KEY_DELIMITER.to_string().as_str());
            map.insert(literal, Value::String(value.to_string()));
        }
        None => {
            let mut child = Map::new();
            insert(&mut child, rest, value);
            map.insert(head.to_string(), Value::Object(child));
        }
    }
}

/// Flattens a tree back into records, joining keys with [`KEY_DELIMITER`].
///
/// Numbers and booleans are kept as their text, `null` becomes an empty
/// translation, and array items are keyed by index.
pub fn flatten(tree: &Map<String, Value>) -> Vec<TranslationRecord> {
    let mut out = Vec::new();
    for (key, child) in tree {
        flatten_into(key.clone(), child, &mut out);
    }
    out
}

fn flatten_into(path: String, value: &Value, out: &mut Vec<TranslationRecord>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(join(&path, key), child, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(join(&path, &index.to_string()), child, out);
            }
        }
        Value::String(s) => out.push(TranslationRecord::new(path, s.as_str())),
        Value::Null => out.push(TranslationRecord::new(path, "")),
        Value::Bool(b) => out.push(TranslationRecord::new(path, b.to_string())),
        Value::Number(n) => out.push(TranslationRecord::new(path, n.to_string())),
    }
}

fn join(prefix: &str, key: &str) -> String {
    format!("{}{}{}", prefix, KEY_DELIMITER, key)
}
