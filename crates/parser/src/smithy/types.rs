//! Smithy JSON AST type definitions
//!
//! These types represent the structure of Smithy JSON AST files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trait values as written in the AST
pub type TraitMap = BTreeMap<String, serde_json::Value>;

/// Root Smithy model document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmithyModel {
    /// Smithy version (e.g., "2.0")
    pub smithy: String,

    /// Shape definitions keyed by absolute shape ID
    #[serde(default)]
    pub shapes: BTreeMap<String, Shape>,

    /// Metadata about the model
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// A Smithy shape as it appears in the AST
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    /// Service definition
    Service {
        /// API version
        #[serde(default)]
        version: Option<String>,

        /// Operations bound to the service
        #[serde(default)]
        operations: Vec<ShapeReference>,

        /// Resources bound to the service
        #[serde(default)]
        resources: Vec<ShapeReference>,

        #[serde(default)]
        traits: TraitMap,
    },

    /// Operation definition
    Operation {
        #[serde(default)]
        input: Option<ShapeReference>,

        #[serde(default)]
        output: Option<ShapeReference>,

        #[serde(default)]
        errors: Vec<ShapeReference>,

        #[serde(default)]
        traits: TraitMap,
    },

    /// Resource definition
    Resource {
        /// Identifier names mapped to the shapes they target
        #[serde(default, with = "super::ordered")]
        identifiers: Vec<(String, ShapeReference)>,

        #[serde(default)]
        create: Option<ShapeReference>,

        #[serde(default)]
        put: Option<ShapeReference>,

        #[serde(default)]
        read: Option<ShapeReference>,

        #[serde(default)]
        update: Option<ShapeReference>,

        #[serde(default)]
        delete: Option<ShapeReference>,

        #[serde(default)]
        list: Option<ShapeReference>,

        #[serde(default)]
        operations: Vec<ShapeReference>,

        #[serde(default, rename = "collectionOperations")]
        collection_operations: Vec<ShapeReference>,

        #[serde(default)]
        resources: Vec<ShapeReference>,

        #[serde(default)]
        traits: TraitMap,
    },

    /// Structure definition
    Structure {
        #[serde(default, with = "super::ordered")]
        members: Vec<(String, Member)>,

        #[serde(default)]
        traits: TraitMap,
    },

    /// Tagged union
    Union {
        #[serde(default, with = "super::ordered")]
        members: Vec<(String, Member)>,

        #[serde(default)]
        traits: TraitMap,
    },

    /// Smithy 2.0 string enum
    Enum {
        #[serde(default, with = "super::ordered")]
        members: Vec<(String, Member)>,

        #[serde(default)]
        traits: TraitMap,
    },

    /// Smithy 2.0 integer enum
    IntEnum {
        #[serde(default, with = "super::ordered")]
        members: Vec<(String, Member)>,

        #[serde(default)]
        traits: TraitMap,
    },

    List {
        member: Member,

        #[serde(default)]
        traits: TraitMap,
    },

    Set {
        member: Member,

        #[serde(default)]
        traits: TraitMap,
    },

    Map {
        key: Member,

        value: Member,

        #[serde(default)]
        traits: TraitMap,
    },

    Blob {
        #[serde(default)]
        traits: TraitMap,
    },

    Boolean {
        #[serde(default)]
        traits: TraitMap,
    },

    String {
        #[serde(default)]
        traits: TraitMap,
    },

    Byte {
        #[serde(default)]
        traits: TraitMap,
    },

    Short {
        #[serde(default)]
        traits: TraitMap,
    },

    Integer {
        #[serde(default)]
        traits: TraitMap,
    },

    Long {
        #[serde(default)]
        traits: TraitMap,
    },

    Float {
        #[serde(default)]
        traits: TraitMap,
    },

    Double {
        #[serde(default)]
        traits: TraitMap,
    },

    BigInteger {
        #[serde(default)]
        traits: TraitMap,
    },

    BigDecimal {
        #[serde(default)]
        traits: TraitMap,
    },

    Timestamp {
        #[serde(default)]
        traits: TraitMap,
    },

    Document {
        #[serde(default)]
        traits: TraitMap,
    },

    /// Fallback for shape types this loader does not know
    #[serde(other)]
    Other,
}

/// Reference to another shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeReference {
    /// Target shape ID (e.g., "com.example#Forecast")
    pub target: String,
}

/// Member definition of an aggregate shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Target shape for this member
    pub target: String,

    #[serde(default)]
    pub traits: TraitMap,
}

impl SmithyModel {
    /// Find the first service shape in the model
    pub fn find_service(&self) -> Option<(&String, &Shape)> {
        self.shapes
            .iter()
            .find(|(_, shape)| matches!(shape, Shape::Service { .. }))
    }

    /// Get a shape by its ID
    pub fn get_shape(&self, shape_id: &str) -> Option<&Shape> {
        self.shapes.get(shape_id)
    }
}

impl Shape {
    /// Smithy type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Service { .. } => "service",
            Shape::Operation { .. } => "operation",
            Shape::Resource { .. } => "resource",
            Shape::Structure { .. } => "structure",
            Shape::Union { .. } => "union",
            Shape::Enum { .. } => "enum",
            Shape::IntEnum { .. } => "intEnum",
            Shape::List { .. } => "list",
            Shape::Set { .. } => "set",
            Shape::Map { .. } => "map",
            Shape::Blob { .. } => "blob",
            Shape::Boolean { .. } => "boolean",
            Shape::String { .. } => "string",
            Shape::Byte { .. } => "byte",
            Shape::Short { .. } => "short",
            Shape::Integer { .. } => "integer",
            Shape::Long { .. } => "long",
            Shape::Float { .. } => "float",
            Shape::Double { .. } => "double",
            Shape::BigInteger { .. } => "bigInteger",
            Shape::BigDecimal { .. } => "bigDecimal",
            Shape::Timestamp { .. } => "timestamp",
            Shape::Document { .. } => "document",
            Shape::Other => "unknown",
        }
    }
}
