//! Resource schema assembly

use crate::config::{CfnConfig, CFN_DEFINITION_POINTER};
use serde::Serialize;
use serde_json::{Map, Value};
use shape_schema_common::{traits, Result, SchemaError, ShapeGraph, ShapeId, ShapeKind};
use shape_schema_jsonschema::{JsonSchemaConverter, Schema};
use std::collections::BTreeMap;
use tracing::debug;

/// A CloudFormation resource schema
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSchema {
    pub type_name: String,

    pub description: String,

    /// Definitions keyed by local name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, Schema>,

    pub properties: BTreeMap<String, Schema>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ResourceSchema {
    /// Render the schema with `additionalProperties: false` applied
    pub fn to_value(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(schema) = &mut value {
            inject_additional_properties(schema);
        }
        Ok(value)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value()?)?)
    }
}

/// Set `additionalProperties: false` on the schema and on every definition
/// that declares `properties`
pub fn inject_additional_properties(schema: &mut Map<String, Value>) {
    schema.insert("additionalProperties".to_string(), Value::Bool(false));

    if let Some(Value::Object(definitions)) = schema.get_mut("definitions") {
        for definition in definitions.values_mut() {
            if let Value::Object(definition) = definition {
                if definition.contains_key("properties") {
                    definition.insert("additionalProperties".to_string(), Value::Bool(false));
                }
            }
        }
    }
}

/// Builds resource schemas from structure shapes
pub struct ResourceSchemaBuilder {
    config: CfnConfig,
    converter: JsonSchemaConverter,
}

impl ResourceSchemaBuilder {
    pub fn new(config: CfnConfig) -> Result<Self> {
        let converter = JsonSchemaConverter::new(config.converter_config())?;
        Ok(Self { config, converter })
    }

    /// Build the resource schema for a structure shape
    ///
    /// The structure's members become the resource's top-level properties
    /// and every shape they reach becomes a definition.
    pub fn build(&self, graph: &ShapeGraph, resource: &ShapeId) -> Result<ResourceSchema> {
        let shape = graph.get(resource).ok_or_else(|| SchemaError::UnresolvedReference {
            referrer: "the resource schema builder".to_string(),
            target: resource.clone(),
        })?;
        if !matches!(shape.kind, ShapeKind::Structure { .. }) {
            return Err(SchemaError::UnsupportedConfiguration(format!(
                "Resource `{}` must be a structure, found {}",
                resource,
                shape.kind.type_name()
            )));
        }

        let type_name = self.config.type_name(resource)?;
        let document = self.converter.convert_shape(graph, resource)?;
        let root = document.root.clone().ok_or_else(|| {
            SchemaError::UnsupportedConfiguration(format!(
                "Resource `{}` is excluded from conversion",
                resource
            ))
        })?;

        // The resource itself is only kept as a definition when something
        // refers back to it.
        let root_pointer = document.root_pointer.as_deref();
        let self_referenced =
            root_pointer.map_or(false, |pointer| document.refs().contains(pointer));

        let prefix = format!("{}/", CFN_DEFINITION_POINTER);
        let definitions: BTreeMap<String, Schema> = document
            .definitions
            .iter()
            .filter(|(pointer, _)| self_referenced || Some(pointer.as_str()) != root_pointer)
            .filter_map(|(pointer, schema)| {
                pointer
                    .strip_prefix(&prefix)
                    .map(|name| (name.to_string(), schema.clone()))
            })
            .collect();

        let description = self
            .config
            .description
            .clone()
            .or_else(|| shape.string_trait(traits::DOCUMENTATION).map(str::to_string))
            .unwrap_or_else(|| format!("Definition of {} Resource Type", type_name));

        debug!(
            type_name = %type_name,
            properties = root.properties.len(),
            definitions = definitions.len(),
            "Built resource schema"
        );

        Ok(ResourceSchema {
            type_name,
            description,
            definitions,
            properties: root.properties,
            required: root.required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inject_additional_properties() {
        let mut schema = json!({
            "properties": { "a": { "$ref": "#/definitions/Obj" } },
            "definitions": {
                "Obj": { "type": "object", "properties": { "x": {} } },
                "Str": { "type": "string" },
                "Map": { "type": "object", "additionalProperties": { "type": "string" } }
            }
        });

        inject_additional_properties(schema.as_object_mut().unwrap());

        assert_eq!(schema["additionalProperties"], json!(false));
        assert_eq!(
            schema["definitions"]["Obj"]["additionalProperties"],
            json!(false)
        );
        assert!(schema["definitions"]["Str"].get("additionalProperties").is_none());
        assert_eq!(
            schema["definitions"]["Map"]["additionalProperties"],
            json!({ "type": "string" })
        );
    }
}
