//! Support for flat and nested JSON.
//!
//! Output uses four-space indentation and keeps document order.

use std::io::{BufRead, Write};

use serde::Serialize;
use serde_json::{Map, Value, ser::PrettyFormatter};

use crate::{
    error::Error,
    formats::nested,
    traits::Parser,
    types::TranslationDocument,
};

/// A single-level JSON object keyed by term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatFormat {
    pub tree: Map<String, Value>,
}

/// A JSON object nested along `.` separated terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedFormat {
    pub tree: Map<String, Value>,
}

pub(crate) fn read_tree<R: BufRead>(reader: R) -> Result<Map<String, Value>, Error> {
    match serde_json::from_reader(reader)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        _ => Err(Error::InvalidResource(
            "JSON translations must be an object".to_string(),
        )),
    }
}

pub(crate) fn write_tree<W: Write>(tree: &Map<String, Value>, mut writer: W) -> Result<(), Error> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
    tree.serialize(&mut ser)?;
    writer.write_all(b"\n")?;
    Ok(())
}

pub(crate) fn tree_to_document(tree: &Map<String, Value>) -> TranslationDocument {
    TranslationDocument::new(String::new(), nested::flatten(tree))
}

impl Parser for FlatFormat {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let tree = read_tree(reader)?;
        if let Some((key, _)) = tree.iter().find(|(_, v)| v.is_object() || v.is_array()) {
            return Err(Error::InvalidResource(format!(
                "flat JSON expects string values, `{}` is nested",
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
