//! The result of a conversion

use crate::schema::Schema;
use serde_json::{Map, Value};
use shape_schema_common::{Result, SchemaError};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A converted JSON Schema document
///
/// Definitions are keyed by their full pointer (e.g. `#/definitions/Foo`)
/// and are nested under that path when the document is rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDocument {
    /// Value of the `$schema` keyword
    pub schema_keyword: Option<String>,

    /// Value of the `$id` keyword
    pub id_keyword: Option<String>,

    /// Schema of the single requested root shape
    pub root: Option<Schema>,

    /// Definition pointer of the root shape
    pub root_pointer: Option<String>,

    pub definitions: BTreeMap<String, Schema>,

    /// Extra top-level members
    pub extensions: Map<String, Value>,
}

impl SchemaDocument {
    /// Look up a schema by pointer; `#` is the root schema
    pub fn get_definition(&self, pointer: &str) -> Option<&Schema> {
        match pointer {
            "" | "#" | "#/" => self.root.as_ref(),
            _ => self.definitions.get(pointer),
        }
    }

    pub fn pointers(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    /// Every `$ref` used anywhere in the document
    pub fn refs(&self) -> BTreeSet<&str> {
        self.root
            .iter()
            .chain(self.definitions.values())
            .flat_map(Schema::refs)
            .collect()
    }

    /// References that do not resolve to a schema of this document
    pub fn dangling_refs(&self) -> Vec<&str> {
        self.refs()
            .into_iter()
            .filter(|pointer| self.get_definition(pointer).is_none())
            .collect()
    }

    /// Render the document as JSON
    ///
    /// The root schema's keywords sit at the top level next to the
    /// extensions, and every definition is nested under its pointer path.
    pub fn to_value(&self) -> Result<Value> {
        let mut document = Map::new();

        if let Some(keyword) = &self.schema_keyword {
            document.insert("$schema".to_string(), Value::String(keyword.clone()));
        }
        if let Some(id) = &self.id_keyword {
            document.insert("$id".to_string(), Value::String(id.clone()));
        }

        if let Some(root) = &self.root {
            if let Value::Object(members) = serde_json::to_value(root)? {
                document.extend(members);
            }
        }

        for (key, value) in &self.extensions {
            document.insert(key.clone(), value.clone());
        }

        for (pointer, schema) in &self.definitions {
            insert_at_pointer(&mut document, pointer, serde_json::to_value(schema)?)?;
        }

        Ok(Value::Object(document))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }

    /// Write the pretty-printed document to a file
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

fn insert_at_pointer(document: &mut Map<String, Value>, pointer: &str, value: Value) -> Result<()> {
    let path = pointer.strip_prefix("#/").ok_or_else(|| {
        SchemaError::UnsupportedConfiguration(format!("Invalid definition pointer `{}`", pointer))
    })?;
    let segments: Vec<&str> = path.split('/').collect();
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut current = document;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            _ => {
                return Err(SchemaError::UnsupportedConfiguration(format!(
                    "Cannot nest `{}` under non-object member `{}`",
                    pointer, segment
                )))
            }
        };
    }

    current.insert(last.to_string(), value);
    Ok(())
}
