//! Integration tests for resource schema assembly

use serde_json::json;
use shape_schema_cloudformation::{CfnConfig, ResourceSchemaBuilder};
use shape_schema_common::{traits, SchemaError, ShapeGraph, ShapeId};

fn id(s: &str) -> ShapeId {
    s.parse().unwrap()
}

fn forecast_graph() -> ShapeGraph {
    ShapeGraph::builder()
        .string("com.example.weather#CityName")
        .integer("com.example.weather#Celsius")
        .structure(
            "com.example.weather#Reading",
            &[("temperature", "com.example.weather#Celsius")],
        )
        .list("com.example.weather#Readings", "com.example.weather#Reading")
        .structure(
            "com.example.weather#Forecast",
            &[
                ("city", "com.example.weather#CityName"),
                ("readings", "com.example.weather#Readings"),
            ],
        )
        .trait_on("com.example.weather#Forecast$city", traits::REQUIRED, json!({}))
        .build()
        .unwrap()
}

#[test]
fn test_resource_schema_layout() {
    let builder = ResourceSchemaBuilder::new(CfnConfig::new("Example")).unwrap();
    let schema = builder
        .build(&forecast_graph(), &id("com.example.weather#Forecast"))
        .unwrap();

    assert_eq!(
        schema.to_value().unwrap(),
        json!({
            "typeName": "Example::Weather::Forecast",
            "description": "Definition of Example::Weather::Forecast Resource Type",
            "definitions": {
                "CityName": { "type": "string" },
                "Celsius": { "type": "number" },
                "Reading": {
                    "type": "object",
                    "properties": {
                        "temperature": { "$ref": "#/definitions/Celsius" }
                    },
                    "additionalProperties": false
                },
                "Readings": {
                    "type": "array",
                    "items": { "$ref": "#/definitions/Reading" }
                }
            },
            "properties": {
                "city": { "$ref": "#/definitions/CityName" },
                "readings": { "$ref": "#/definitions/Readings" }
            },
            "required": ["city"],
            "additionalProperties": false
        })
    );
}

#[test]
fn test_description_from_documentation() {
    let graph = ShapeGraph::builder()
        .string("com.example#Name")
        .structure("com.example#Widget", &[("name", "com.example#Name")])
        .with_trait(traits::DOCUMENTATION, json!("A widget"))
        .build()
        .unwrap();

    let schema = ResourceSchemaBuilder::new(CfnConfig::new("Example"))
        .unwrap()
        .build(&graph, &id("com.example#Widget"))
        .unwrap();
    assert_eq!(schema.description, "A widget");
}

#[test]
fn test_self_referencing_resource_keeps_its_definition() {
    let graph = ShapeGraph::builder()
        .list("com.example#Children", "com.example#Folder")
        .structure("com.example#Folder", &[("children", "com.example#Children")])
        .build()
        .unwrap();

    let config = CfnConfig::from_type_name("Example::Files::Folder").unwrap();
    let schema = ResourceSchemaBuilder::new(config)
        .unwrap()
        .build(&graph, &id("com.example#Folder"))
        .unwrap();

    assert!(schema.definitions.contains_key("Folder"));
    assert!(schema.definitions.contains_key("Children"));
}

#[test]
fn test_names_are_alphanumeric() {
    let graph = ShapeGraph::builder()
        .string("com.example#Display_Name")
        .structure("com.example#Widget", &[("name", "com.example#Display_Name")])
        .build()
        .unwrap();

    let schema = ResourceSchemaBuilder::new(CfnConfig::new("Example"))
        .unwrap()
        .build(&graph, &id("com.example#Widget"))
        .unwrap();

    assert!(schema.definitions.contains_key("DisplayName"));
    assert_eq!(
        schema.properties["name"].ref_.as_deref(),
        Some("#/definitions/DisplayName")
    );
}

#[test]
fn test_resource_must_be_structure() {
    let graph = ShapeGraph::builder()
        .string("com.example#Name")
        .build()
        .unwrap();

    let result = ResourceSchemaBuilder::new(CfnConfig::new("Example"))
        .unwrap()
        .build(&graph, &id("com.example#Name"));
    assert!(matches!(
        result,
        Err(SchemaError::UnsupportedConfiguration(_))
    ));
}
