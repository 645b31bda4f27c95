//! Conversion settings
//!
//! Configuration is plain serde data with camelCase keys, so the same struct
//! can be read from JSON or YAML files and embedded in larger configs.

use crate::schema::KEYWORDS;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shape_schema_common::{Result, SchemaError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default location of the definitions section
pub const DEFAULT_DEFINITION_POINTER: &str = "#/definitions";

/// Keys accepted in a serialized `JsonSchemaConfig`
pub const CONFIG_KEYS: &[&str] = &[
    "definitionPointer",
    "definitionPointerPrefix",
    "preserveNamespaces",
    "alphanumericOnlyPointers",
    "includePrivateShapes",
    "memberDefinitions",
    "unionStrategy",
    "defaultTimestampFormat",
    "useJsonName",
    "useIntegerType",
    "disableKeywords",
    "schemaDocumentExtensions",
    "schemaKeyword",
];

/// How union shapes are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnionStrategy {
    /// One single-property object per member under `oneOf`
    #[default]
    OneOf,
    /// An empty object schema
    Object,
    /// Rendered the same way as a structure
    Structure,
}

/// How timestamps are rendered when a shape has no `timestampFormat` trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimestampFormat {
    #[default]
    DateTime,
    EpochSeconds,
    HttpDate,
}

impl TimestampFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampFormat::DateTime => "date-time",
            TimestampFormat::EpochSeconds => "epoch-seconds",
            TimestampFormat::HttpDate => "http-date",
        }
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimestampFormat {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "date-time" => Ok(TimestampFormat::DateTime),
            "epoch-seconds" => Ok(TimestampFormat::EpochSeconds),
            "http-date" => Ok(TimestampFormat::HttpDate),
            other => Err(SchemaError::UnsupportedConfiguration(format!(
                "Unknown timestamp format `{}`",
                other
            ))),
        }
    }
}

/// Settings for one `JsonSchemaConverter`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonSchemaConfig {
    /// Pointer prefix under which definitions are written
    #[serde(alias = "definitionPointerPrefix")]
    pub definition_pointer: String,

    /// Prefix local names with the capitalized namespace
    pub preserve_namespaces: bool,

    /// Strip everything but ASCII letters and digits from local names
    pub alphanumeric_only_pointers: bool,

    pub include_private_shapes: bool,

    /// Emit a definition for every kept member and point references at it
    pub member_definitions: bool,

    pub union_strategy: UnionStrategy,

    pub default_timestamp_format: TimestampFormat,

    /// Use the `jsonName` trait as the property name when present
    pub use_json_name: bool,

    /// Render integral shapes as `integer` instead of `number`
    pub use_integer_type: bool,

    /// Keywords removed from every generated schema
    pub disable_keywords: Vec<String>,

    /// Extra top-level members merged into the document
    pub schema_document_extensions: Map<String, Value>,

    /// Value of the document's `$schema` keyword
    pub schema_keyword: Option<String>,
}

impl Default for JsonSchemaConfig {
    fn default() -> Self {
        Self {
            definition_pointer: DEFAULT_DEFINITION_POINTER.to_string(),
            preserve_namespaces: false,
            alphanumeric_only_pointers: false,
            include_private_shapes: false,
            member_definitions: false,
            union_strategy: UnionStrategy::default(),
            default_timestamp_format: TimestampFormat::default(),
            use_json_name: false,
            use_integer_type: false,
            disable_keywords: Vec::new(),
            schema_document_extensions: Map::new(),
            schema_keyword: None,
        }
    }
}

impl JsonSchemaConfig {
    /// Load a config from a `.json`, `.yaml`, or `.yml` file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let value: Value = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| {
                SchemaError::Parse(format!("Invalid YAML in {}: {}", path.display(), e))
            })?,
            _ => serde_json::from_str(&content).map_err(|e| {
                SchemaError::Parse(format!("Invalid JSON in {}: {}", path.display(), e))
            })?,
        };

        Self::from_value(value)
    }

    /// Build a config from an already parsed value and validate it
    pub fn from_value(value: Value) -> Result<Self> {
        Self::check_keys(&value, &[])?;
        let config: Self = serde_json::from_value(value)
            .map_err(|e| SchemaError::UnsupportedConfiguration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject keys that are neither config keys nor listed in `extra`
    ///
    /// Configs that flatten this struct pass their own keys as `extra`.
    pub fn check_keys(value: &Value, extra: &[&str]) -> Result<()> {
        let Value::Object(map) = value else {
            return Ok(());
        };

        let unknown: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|key| !CONFIG_KEYS.contains(key) && !extra.contains(key))
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }

        Err(SchemaError::UnsupportedConfiguration(format!(
            "Unknown config keys: {}",
            unknown.join(", ")
        )))
    }

    /// Check settings that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        let segments = self
            .definition_prefix()
            .strip_prefix("#/")
            .ok_or_else(|| {
                SchemaError::UnsupportedConfiguration(format!(
                    "definitionPointer `{}` must start with `#/`",
                    self.definition_pointer
                ))
            })?;

        if segments.split('/').any(str::is_empty) {
            return Err(SchemaError::UnsupportedConfiguration(format!(
                "definitionPointer `{}` contains an empty segment",
                self.definition_pointer
            )));
        }

        if let Some(unknown) = self
            .disable_keywords
            .iter()
            .find(|keyword| !KEYWORDS.contains(&keyword.as_str()))
        {
            return Err(SchemaError::UnsupportedConfiguration(format!(
                "Cannot disable unknown keyword `{}`",
                unknown
            )));
        }

        Ok(())
    }

    /// Definition pointer without a trailing slash
    pub fn definition_prefix(&self) -> &str {
        self.definition_pointer
            .strip_suffix('/')
            .unwrap_or(&self.definition_pointer)
    }

    pub fn is_keyword_disabled(&self, keyword: &str) -> bool {
        self.disable_keywords.iter().any(|k| k == keyword)
    }
}
