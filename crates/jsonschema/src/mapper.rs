//! Schema mappers
//!
//! Mappers post-process the schema built for each shape. The converter runs
//! them in ascending `order()`; ties keep the order they were added in.

use crate::config::JsonSchemaConfig;
use crate::schema::Schema;
use serde_json::{Number, Value};
use shape_schema_common::{traits, Shape};

/// Updates the schema generated for a shape
#[cfg_attr(test, mockall::automock)]
pub trait SchemaMapper {
    /// Position among the converter's mappers; lower runs first
    fn order(&self) -> i8 {
        0
    }

    fn update_schema(&self, shape: &Shape, schema: &mut Schema, config: &JsonSchemaConfig);
}

/// Maps documentation and constraint traits onto schema keywords
#[derive(Debug, Default, Clone, Copy)]
pub struct TraitMapper;

impl SchemaMapper for TraitMapper {
    fn order(&self) -> i8 {
        i8::MIN
    }

    fn update_schema(&self, shape: &Shape, schema: &mut Schema, _config: &JsonSchemaConfig) {
        if let Some(doc) = shape.string_trait(traits::DOCUMENTATION) {
            schema.description = Some(doc.to_string());
        }
        if let Some(title) = shape.string_trait(traits::TITLE) {
            schema.title = Some(title.to_string());
        }
        if let Some(media_type) = shape.string_trait(traits::MEDIA_TYPE) {
            schema.content_media_type = Some(media_type.to_string());
        }
        if let Some(pattern) = shape.string_trait(traits::PATTERN) {
            schema.pattern = Some(pattern.to_string());
        }

        if let Some(range) = shape.get_trait(traits::RANGE) {
            if let Some(min) = number(range, "min") {
                schema.minimum = Some(min);
            }
            if let Some(max) = number(range, "max") {
                schema.maximum = Some(max);
            }
        }

        if let Some(length) = shape.get_trait(traits::LENGTH) {
            let min = length.get("min").and_then(Value::as_u64);
            let max = length.get("max").and_then(Value::as_u64);
            match schema.type_.as_deref() {
                Some("array") => {
                    schema.min_items = min.or(schema.min_items);
                    schema.max_items = max.or(schema.max_items);
                }
                Some("object") => {
                    schema.min_properties = min.or(schema.min_properties);
                    schema.max_properties = max.or(schema.max_properties);
                }
                _ => {
                    schema.min_length = min.or(schema.min_length);
                    schema.max_length = max.or(schema.max_length);
                }
            }
        }

        if shape.has_trait(traits::UNIQUE_ITEMS) {
            schema.unique_items = true;
        }

        if let Some(Value::Array(entries)) = shape.get_trait(traits::ENUM) {
            let values: Vec<Value> = entries
                .iter()
                .filter_map(|entry| entry.get("value").cloned())
                .collect();
            if !values.is_empty() {
                schema.enum_values = Some(values);
            }
        }
    }
}

/// Removes the keywords listed in `disableKeywords`
#[derive(Debug, Default, Clone, Copy)]
pub struct DisableKeywordsMapper;

impl SchemaMapper for DisableKeywordsMapper {
    fn order(&self) -> i8 {
        i8::MAX
    }

    fn update_schema(&self, _shape: &Shape, schema: &mut Schema, config: &JsonSchemaConfig) {
        for keyword in &config.disable_keywords {
            schema.remove_keyword(keyword);
        }
    }
}

fn number(value: &Value, key: &str) -> Option<Number> {
    match value.get(key)? {
        Value::Number(n) => Some(n.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shape_schema_common::ShapeKind;

    fn shape(kind: ShapeKind) -> Shape {
        Shape::new("com.example#Thing".parse().unwrap(), kind)
    }

    #[test]
    fn test_documentation_and_constraints() {
        let shape = shape(ShapeKind::Integer)
            .with_trait(traits::DOCUMENTATION, json!("How many"))
            .with_trait(traits::RANGE, json!({ "min": 1, "max": 10 }));
        let mut schema = Schema::typed("number");

        TraitMapper.update_schema(&shape, &mut schema, &JsonSchemaConfig::default());

        assert_eq!(schema.description.as_deref(), Some("How many"));
        assert_eq!(schema.minimum, Some(Number::from(1)));
        assert_eq!(schema.maximum, Some(Number::from(10)));
    }

    #[test]
    fn test_length_depends_on_schema_type() {
        let shape = shape(ShapeKind::String).with_trait(traits::LENGTH, json!({ "min": 2 }));

        let mut string = Schema::typed("string");
        TraitMapper.update_schema(&shape, &mut string, &JsonSchemaConfig::default());
        assert_eq!(string.min_length, Some(2));

        let mut array = Schema::typed("array");
        TraitMapper.update_schema(&shape, &mut array, &JsonSchemaConfig::default());
        assert_eq!(array.min_items, Some(2));
        assert_eq!(array.min_length, None);

        let mut object = Schema::typed("object");
        TraitMapper.update_schema(&shape, &mut object, &JsonSchemaConfig::default());
        assert_eq!(object.min_properties, Some(2));
    }

    #[test]
    fn test_enum_trait_values() {
        let shape = shape(ShapeKind::String).with_trait(
            traits::ENUM,
            json!([{ "name": "RED", "value": "red" }, { "value": "blue" }]),
        );
        let mut schema = Schema::typed("string");
        TraitMapper.update_schema(&shape, &mut schema, &JsonSchemaConfig::default());
        assert_eq!(schema.enum_values, Some(vec![json!("red"), json!("blue")]));
    }

    #[test]
    fn test_disable_keywords() {
        let config = JsonSchemaConfig {
            disable_keywords: vec!["propertyNames".to_string(), "description".to_string()],
            ..Default::default()
        };
        let mut schema = Schema::typed("object");
        schema.property_names = Some(Box::new(Schema::reference("#/definitions/K")));
        schema.description = Some("docs".to_string());

        DisableKeywordsMapper.update_schema(&shape(ShapeKind::String), &mut schema, &config);

        assert_eq!(schema, Schema::typed("object"));
    }

    #[test]
    fn test_builtin_order() {
        assert!(TraitMapper.order() < DisableKeywordsMapper.order());
        let mut mock = MockSchemaMapper::new();
        mock.expect_order().return_const(5i8);
        assert_eq!(mock.order(), 5);
    }
}
