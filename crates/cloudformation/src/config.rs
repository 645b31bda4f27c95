//! CloudFormation conversion settings

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shape_schema_common::{Result, SchemaError, ShapeId};
use shape_schema_jsonschema::JsonSchemaConfig;
use std::path::Path;

/// Pointer prefix required by the resource schema format
pub const CFN_DEFINITION_POINTER: &str = "#/definitions";

const CFN_KEYS: &[&str] = &["organizationName", "serviceName", "resourceName", "description"];

/// Settings for building resource schemas
///
/// JSON Schema settings sit at the same level as the CloudFormation ones,
/// so one config file can drive both converters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CfnConfig {
    /// First segment of every type name (e.g. `Example`)
    pub organization_name: String,

    /// Second segment; defaults to the resource's last namespace segment
    pub service_name: Option<String>,

    /// Third segment; defaults to the resource shape name
    pub resource_name: Option<String>,

    /// Resource description; defaults to the shape's documentation
    pub description: Option<String>,

    #[serde(flatten)]
    pub json_schema: JsonSchemaConfig,
}

impl CfnConfig {
    pub fn new(organization_name: impl Into<String>) -> Self {
        Self {
            organization_name: organization_name.into(),
            ..Default::default()
        }
    }

    /// Settings from a full type name such as `Example::Weather::Forecast`
    pub fn from_type_name(type_name: &str) -> Result<Self> {
        match type_name.split("::").collect::<Vec<_>>()[..] {
            [organization, service, resource]
                if [organization, service, resource]
                    .iter()
                    .all(|segment| is_type_name_segment(segment)) =>
            {
                Ok(Self {
                    organization_name: organization.to_string(),
                    service_name: Some(service.to_string()),
                    resource_name: Some(resource.to_string()),
                    ..Default::default()
                })
            }
            _ => Err(SchemaError::UnsupportedConfiguration(format!(
                "Invalid resource type name `{}`: expected `Organization::Service::Resource`",
                type_name
            ))),
        }
    }

    /// Load settings from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_value(serde_json::from_str(&content)?)
    }

    /// Build settings from a parsed value, rejecting unknown keys
    pub fn from_value(value: Value) -> Result<Self> {
        JsonSchemaConfig::check_keys(&value, CFN_KEYS)?;
        let config: Self = serde_json::from_value(value)
            .map_err(|e| SchemaError::UnsupportedConfiguration(e.to_string()))?;
        config.json_schema.validate()?;
        Ok(config)
    }

    /// `Organization::Service::Resource` for a resource shape
    pub fn type_name(&self, resource: &ShapeId) -> Result<String> {
        if !is_type_name_segment(&self.organization_name) {
            return Err(SchemaError::UnsupportedConfiguration(format!(
                "organizationName `{}` is not a valid type name segment",
                self.organization_name
            )));
        }

        let service = match &self.service_name {
            Some(service) => service.clone(),
            None => resource
                .namespace()
                .rsplit('.')
                .next()
                .map(capitalize)
                .unwrap_or_default(),
        };
        let resource_name = self
            .resource_name
            .clone()
            .unwrap_or_else(|| resource.name().to_string());

        Ok(format!(
            "{}::{}::{}",
            self.organization_name, service, resource_name
        ))
    }

    /// JSON Schema settings with the constraints resource schemas need
    ///
    /// Definitions always live under `#/definitions` with alphanumeric names.
    pub fn converter_config(&self) -> JsonSchemaConfig {
        JsonSchemaConfig {
            definition_pointer: CFN_DEFINITION_POINTER.to_string(),
            alphanumeric_only_pointers: true,
            ..self.json_schema.clone()
        }
    }
}

fn is_type_name_segment(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_name_defaults() {
        let config = CfnConfig::new("Example");
        let name = config
            .type_name(&"com.example.weather#Forecast".parse().unwrap())
            .unwrap();
        assert_eq!(name, "Example::Weather::Forecast");
    }

    #[test]
    fn test_type_name_overrides() {
        let config = CfnConfig::from_type_name("Org::Svc::Thing").unwrap();
        let name = config
            .type_name(&"com.example#Forecast".parse().unwrap())
            .unwrap();
        assert_eq!(name, "Org::Svc::Thing");
    }

    #[test]
    fn test_invalid_type_names() {
        for type_name in ["Org::Svc", "Org::::Res", "Org::Svc::Res::Extra", "Org::S-v::Res"] {
            assert!(
                CfnConfig::from_type_name(type_name).is_err(),
                "{} should be rejected",
                type_name
            );
        }
        assert!(CfnConfig::default()
            .type_name(&"com.example#Forecast".parse().unwrap())
            .is_err());
    }

    #[test]
    fn test_converter_config_forces_pointer_settings() {
        let config: CfnConfig = serde_json::from_value(json!({
            "organizationName": "Example",
            "definitionPointer": "#/components/schemas",
            "useJsonName": true
        }))
        .unwrap();

        let converter_config = config.converter_config();
        assert_eq!(converter_config.definition_pointer, "#/definitions");
        assert!(converter_config.alphanumeric_only_pointers);
        assert!(converter_config.use_json_name);
    }

    #[test]
    fn test_from_value_checks_keys() {
        let config = CfnConfig::from_value(json!({
            "organizationName": "Example",
            "definitionPointer": "#/components/schemas/",
            "alphanumericOnlyPointers": false
        }))
        .unwrap();
        assert_eq!(config.organization_name, "Example");
        assert_eq!(config.json_schema.definition_prefix(), "#/components/schemas");

        let result = CfnConfig::from_value(json!({
            "organizationName": "Example",
            "organisationName": "Typo"
        }));
        assert!(matches!(
            result,
            Err(SchemaError::UnsupportedConfiguration(_))
        ));
    }
}
