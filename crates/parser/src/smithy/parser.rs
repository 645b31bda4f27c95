//! Smithy JSON AST file parser

use super::types::SmithyModel;
use shape_schema_common::{Result, SchemaError, ShapeGraph, ShapeId};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Smithy JSON AST parser
///
/// Reads a Smithy JSON AST document and converts it into a `ShapeGraph`
pub struct SmithyParser {
    /// Loaded Smithy model
    model: SmithyModel,
}

impl SmithyParser {
    /// Load Smithy model from file path
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = SmithyParser::from_file("model/weather.json")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            SchemaError::Parse(format!(
                "Failed to read Smithy file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        debug!(path = %path.as_ref().display(), "Loading Smithy model");
        Self::from_json(&content)
    }

    /// Parse Smithy model from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let model: SmithyModel = serde_json::from_str(json)
            .map_err(|e| SchemaError::Parse(format!("Failed to parse Smithy JSON: {}", e)))?;

        Ok(Self { model })
    }

    /// Convert the Smithy model into a shape graph
    pub fn parse(&self) -> Result<ShapeGraph> {
        super::converter::convert_smithy_to_shape_graph(&self.model)
    }

    /// ID of the first service shape in the model, if any
    pub fn service_id(&self) -> Result<Option<ShapeId>> {
        self.model
            .find_service()
            .map(|(id, _)| id.parse())
            .transpose()
    }

    /// Get reference to the underlying Smithy model
    pub fn model(&self) -> &SmithyModel {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_smithy() {
        let smithy_json = r#"{
            "smithy": "2.0",
            "shapes": {
                "com.example#MyService": {
                    "type": "service",
                    "version": "1.0.0",
                    "operations": []
                }
            }
        }"#;

        let parser = SmithyParser::from_json(smithy_json);
        assert!(parser.is_ok());

        let parser = parser.unwrap();
        assert_eq!(parser.model.smithy, "2.0");
        assert_eq!(parser.model.shapes.len(), 1);
        assert_eq!(
            parser.service_id().unwrap().unwrap().to_string(),
            "com.example#MyService"
        );
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = SmithyParser::from_json("{ not json");
        assert!(matches!(result, Err(SchemaError::Parse(_))));
    }

    #[test]
    fn test_unknown_shape_type_rejected_on_parse() {
        let smithy_json = r#"{
            "smithy": "2.0",
            "shapes": {
                "com.example#Thing": { "type": "gizmo" }
            }
        }"#;

        let parser = SmithyParser::from_json(smithy_json).unwrap();
        let err = parser.parse().unwrap_err();
        assert!(err.to_string().contains("com.example#Thing"));
    }
}
