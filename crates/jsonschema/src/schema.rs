//! JSON Schema value type

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Keywords a `Schema` can carry, by their JSON names
pub const KEYWORDS: &[&str] = &[
    "$ref",
    "type",
    "enum",
    "const",
    "default",
    "multipleOf",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "items",
    "maxItems",
    "minItems",
    "uniqueItems",
    "maxProperties",
    "minProperties",
    "required",
    "properties",
    "additionalProperties",
    "propertyNames",
    "oneOf",
    "title",
    "description",
    "format",
    "$comment",
    "readOnly",
    "writeOnly",
    "examples",
    "contentEncoding",
    "contentMediaType",
];

/// One JSON Schema object
///
/// Nested schemas produced by the converter are always `$ref`s into the
/// definitions table. Keywords this struct does not model go into
/// `extensions` and are written as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub ref_: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub unique_items: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,

    /// Required property names, kept sorted
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Schema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_names: Option<Box<Schema>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<Schema>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(rename = "$comment", skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,

    #[serde(default, skip_serializing_if = "is_false")]
    pub write_only: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_media_type: Option<String>,

    /// Additional keywords
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Schema {
    /// A schema that only refers to a pointer
    pub fn reference(pointer: impl Into<String>) -> Self {
        Self {
            ref_: Some(pointer.into()),
            ..Default::default()
        }
    }

    /// A schema with only a `type`
    pub fn typed(type_: &str) -> Self {
        Self {
            type_: Some(type_.to_string()),
            ..Default::default()
        }
    }

    /// Add a required property name, keeping the list sorted and unique
    pub fn require(&mut self, name: &str) {
        if let Err(index) = self.required.binary_search_by(|n| n.as_str().cmp(name)) {
            self.required.insert(index, name.to_string());
        }
    }

    /// Every `$ref` in this schema and its nested schemas
    pub fn refs(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        let mut stack = vec![self];

        while let Some(schema) = stack.pop() {
            if let Some(pointer) = &schema.ref_ {
                refs.push(pointer.as_str());
            }
            stack.extend(schema.items.as_deref());
            stack.extend(schema.additional_properties.as_deref());
            stack.extend(schema.property_names.as_deref());
            stack.extend(schema.properties.values());
            stack.extend(schema.one_of.iter());
        }

        refs
    }

    /// Remove a keyword by its JSON name, returning whether it was set
    pub fn remove_keyword(&mut self, keyword: &str) -> bool {
        fn take<T>(slot: &mut Option<T>) -> bool {
            slot.take().is_some()
        }

        match keyword {
            "$ref" => take(&mut self.ref_),
            "type" => take(&mut self.type_),
            "enum" => take(&mut self.enum_values),
            "const" => take(&mut self.const_value),
            "default" => take(&mut self.default_value),
            "multipleOf" => take(&mut self.multiple_of),
            "maximum" => take(&mut self.maximum),
            "exclusiveMaximum" => take(&mut self.exclusive_maximum),
            "minimum" => take(&mut self.minimum),
            "exclusiveMinimum" => take(&mut self.exclusive_minimum),
            "maxLength" => take(&mut self.max_length),
            "minLength" => take(&mut self.min_length),
            "pattern" => take(&mut self.pattern),
            "items" => take(&mut self.items),
            "maxItems" => take(&mut self.max_items),
            "minItems" => take(&mut self.min_items),
            "uniqueItems" => std::mem::take(&mut self.unique_items),
            "maxProperties" => take(&mut self.max_properties),
            "minProperties" => take(&mut self.min_properties),
            "required" => !std::mem::take(&mut self.required).is_empty(),
            "properties" => !std::mem::take(&mut self.properties).is_empty(),
            "additionalProperties" => take(&mut self.additional_properties),
            "propertyNames" => take(&mut self.property_names),
            "oneOf" => !std::mem::take(&mut self.one_of).is_empty(),
            "title" => take(&mut self.title),
            "description" => take(&mut self.description),
            "format" => take(&mut self.format),
            "$comment" => take(&mut self.comment),
            "readOnly" => std::mem::take(&mut self.read_only),
            "writeOnly" => std::mem::take(&mut self.write_only),
            "examples" => take(&mut self.examples),
            "contentEncoding" => take(&mut self.content_encoding),
            "contentMediaType" => take(&mut self.content_media_type),
            other => self.extensions.remove(other).is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_skips_unset_keywords() {
        let mut schema = Schema::typed("object");
        schema
            .properties
            .insert("name".to_string(), Schema::reference("#/definitions/Name"));
        schema.require("name");

        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "$ref": "#/definitions/Name" }
                }
            })
        );
    }

    #[test]
    fn test_require_keeps_sorted_unique() {
        let mut schema = Schema::default();
        schema.require("b");
        schema.require("a");
        schema.require("b");
        assert_eq!(schema.required, vec!["a", "b"]);
    }

    #[test]
    fn test_refs_are_collected_from_nested_schemas() {
        let mut schema = Schema::typed("object");
        schema.property_names = Some(Box::new(Schema::reference("#/definitions/K")));
        schema.additional_properties = Some(Box::new(Schema::reference("#/definitions/V")));
        schema.one_of.push(Schema::reference("#/definitions/A"));

        let mut refs = schema.refs();
        refs.sort();
        assert_eq!(
            refs,
            vec!["#/definitions/A", "#/definitions/K", "#/definitions/V"]
        );
    }

    #[test]
    fn test_remove_keyword() {
        let mut schema = Schema::typed("string");
        schema.pattern = Some("^a$".to_string());
        schema
            .extensions
            .insert("x-custom".to_string(), json!(true));

        assert!(schema.remove_keyword("pattern"));
        assert!(!schema.remove_keyword("pattern"));
        assert!(schema.remove_keyword("x-custom"));
        assert_eq!(schema, Schema::typed("string"));
    }

    #[test]
    fn test_unknown_keywords_round_trip_through_extensions() {
        let schema: Schema = serde_json::from_value(json!({
            "type": "string",
            "x-amazon-tag": "value"
        }))
        .unwrap();
        assert_eq!(schema.extensions["x-amazon-tag"], json!("value"));
    }

    #[test]
    fn test_keywords_cover_serialized_names() {
        let mut schema = Schema::reference("#/definitions/A");
        schema.unique_items = true;
        schema.read_only = true;
        schema.comment = Some("note".to_string());
        let value = serde_json::to_value(&schema).unwrap();
        for key in value.as_object().unwrap().keys() {
            assert!(KEYWORDS.contains(&key.as_str()), "{} missing", key);
        }
    }
}
