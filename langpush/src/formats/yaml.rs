//! Support for flat and nested YAML.
//!
//! Values are written through `serde_yaml`, which quotes strings whenever a
//! plain scalar would read back as something else (`true`, `1.0`, `~`, `a: b`).

use std::io::{BufRead, Write};

use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

use crate::{
    error::Error,
    formats::{json::tree_to_document, nested},
    traits::Parser,
    types::TranslationDocument,
};

/// A single-level YAML mapping keyed by term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatFormat {
    pub tree: Map<String, Value>,
}

/// A YAML mapping nested along `.` separated terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedFormat {
    pub tree: Map<String, Value>,
}

fn read_tree<R: BufRead>(reader: R) -> Result<Map<String, Value>, Error> {
    let value: YamlValue = serde_yaml::from_reader(reader)?;
    match yaml_to_json(value)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(Error::InvalidResource(
            "YAML translations must be a mapping".to_string(),
        )),
    }
}

fn write_tree<W: Write>(tree: &Map<String, Value>, writer: W) -> Result<(), Error> {
    serde_yaml::to_writer(writer, tree)?;
    Ok(())
}

/// Converts a YAML value into the JSON tree shared by the nested helpers.
///
/// Mapping keys that are not strings (`1:`, `true:`) keep their text.
fn yaml_to_json(value: YamlValue) -> Result<Value, Error> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => number_to_json(&n),
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (key, child) in mapping {
                map.insert(yaml_key(key)?, yaml_to_json(child)?);
            }
            Value::Object(map)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn number_to_json(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        // NaN and infinities have no JSON number, keep their YAML spelling.
        n.as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(n.to_string()))
    }
}

fn yaml_key(key: YamlValue) -> Result<String, Error> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Null => Ok(String::new()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Tagged(tagged) => yaml_key(tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => Err(Error::InvalidResource(
            "YAML mapping keys must be scalars".to_string(),
        )),
    }
}

impl Parser for FlatFormat {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let tree = read_tree(reader)?;
        if let Some((key, _)) = tree.iter().find(|(_, v)| v.is_object() || v.is_array()) {
            return Err(Error::InvalidResource(format!(
                "flat YAML expects scalar values, `{}` is nested",
                key
            )));
        }
        Ok(FlatFormat { tree })
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        write_tree(&self.tree, writer)
    }
}

impl Parser for NestedFormat {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        Ok(NestedFormat {
            tree: read_tree(reader)?,
        })
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error> {
        write_tree(&self.tree, writer)
    }
}

impl From<TranslationDocument> for FlatFormat {
    fn from(value: TranslationDocument) -> Self {
        FlatFormat {
            tree: nested::flat_tree(&value),
        }
    }
}

impl From<TranslationDocument> for NestedFormat {
    fn from(value: TranslationDocument) -> Self {
        NestedFormat {
            tree: nested::nest(&value),
        }
    }
}

impl From<FlatFormat> for TranslationDocument {
    fn from(value: FlatFormat) -> Self {
        tree_to_document(&value.tree)
    }
}

impl From<NestedFormat> for TranslationDocument {
    fn from(value: NestedFormat) -> Self {
        tree_to_document(&value.tree)
    }
}
