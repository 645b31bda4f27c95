//! Shape identifiers and shape definitions

use crate::{Result, SchemaError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Trait values attached to a shape, keyed by absolute trait name
/// (e.g., "smithy.api#documentation")
pub type Traits = BTreeMap<String, serde_json::Value>;

/// Absolute shape identifier
///
/// Formatted as `namespace#Name` or `namespace#Name$member`. Identifiers are
/// ordered by namespace, then name, then member name, and that order is what
/// every deterministic tie-break in the workspace relies on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShapeId {
    namespace: String,
    name: String,
    member: Option<String>,
}

impl ShapeId {
    /// Create a shape ID from a namespace and a shape name
    pub fn from_parts(namespace: &str, name: &str) -> Result<Self> {
        validate_namespace(namespace)?;
        validate_identifier(name)?;
        Ok(Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            member: None,
        })
    }

    /// Create the ID of a member of this shape
    pub fn with_member(&self, member: &str) -> Result<Self> {
        validate_identifier(member)?;
        Ok(Self {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            member: Some(member.to_string()),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    pub fn is_member(&self) -> bool {
        self.member.is_some()
    }

    /// ID of the shape that contains this member, or the ID itself
    pub fn container(&self) -> ShapeId {
        Self {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
            member: None,
        }
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.namespace, self.name)?;
        if let Some(member) = &self.member {
            write!(f, "${}", member)?;
        }
        Ok(())
    }
}

impl FromStr for ShapeId {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self> {
        let (namespace, rest) = s
            .split_once('#')
            .ok_or_else(|| SchemaError::Parse(format!("Invalid shape ID `{}`: missing '#'", s)))?;

        let id = match rest.split_once('$') {
            Some((name, member)) => Self::from_parts(namespace, name)?.with_member(member)?,
            None => Self::from_parts(namespace, rest)?,
        };

        Ok(id)
    }
}

impl TryFrom<String> for ShapeId {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ShapeId> for String {
    fn from(id: ShapeId) -> Self {
        id.to_string()
    }
}

fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(SchemaError::Parse("Shape ID namespace is empty".to_string()));
    }
    namespace.split('.').try_for_each(validate_identifier)
}

fn validate_identifier(identifier: &str) -> Result<()> {
    let mut chars = identifier.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SchemaError::Parse(format!(
            "Invalid shape identifier `{}`",
            identifier
        )))
    }
}

/// The kind of a shape and the edges it owns
///
/// Aggregate kinds list their member shape IDs in declared order. Members
/// are shapes of their own (`ShapeKind::Member`) pointing at a target.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Blob,
    Boolean,
    String,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    Timestamp,
    Document,
    List {
        member: ShapeId,
    },
    Set {
        member: ShapeId,
    },
    Map {
        key: ShapeId,
        value: ShapeId,
    },
    Structure {
        members: Vec<ShapeId>,
    },
    Union {
        members: Vec<ShapeId>,
    },
    Member {
        target: ShapeId,
    },
    Operation {
        input: Option<ShapeId>,
        output: Option<ShapeId>,
        errors: Vec<ShapeId>,
    },
    Resource {
        /// Identifier name and the shape it targets
        identifiers: Vec<(String, ShapeId)>,
        /// Lifecycle operations (create, put, read, update, delete, list)
        lifecycle: Vec<ShapeId>,
        operations: Vec<ShapeId>,
        resources: Vec<ShapeId>,
    },
    Service {
        operations: Vec<ShapeId>,
        resources: Vec<ShapeId>,
    },
}

impl ShapeKind {
    /// Smithy type name of the kind
    pub fn type_name(&self) -> &'static str {
        match self {
            ShapeKind::Blob => "blob",
            ShapeKind::Boolean => "boolean",
            ShapeKind::String => "string",
            ShapeKind::Byte => "byte",
            ShapeKind::Short => "short",
            ShapeKind::Integer => "integer",
            ShapeKind::Long => "long",
            ShapeKind::Float => "float",
            ShapeKind::Double => "double",
            ShapeKind::BigInteger => "bigInteger",
            ShapeKind::BigDecimal => "bigDecimal",
            ShapeKind::Timestamp => "timestamp",
            ShapeKind::Document => "document",
            ShapeKind::List { .. } => "list",
            ShapeKind::Set { .. } => "set",
            ShapeKind::Map { .. } => "map",
            ShapeKind::Structure { .. } => "structure",
            ShapeKind::Union { .. } => "union",
            ShapeKind::Member { .. } => "member",
            ShapeKind::Operation { .. } => "operation",
            ShapeKind::Resource { .. } => "resource",
            ShapeKind::Service { .. } => "service",
        }
    }

    /// Services, resources, and operations have no schema representation
    pub fn is_schema_kind(&self) -> bool {
        !matches!(
            self,
            ShapeKind::Operation { .. } | ShapeKind::Resource { .. } | ShapeKind::Service { .. }
        )
    }

    /// Numeric kinds without a fractional part
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            ShapeKind::Byte
                | ShapeKind::Short
                | ShapeKind::Integer
                | ShapeKind::Long
                | ShapeKind::BigInteger
        )
    }

    /// Outgoing edges in declared order
    pub fn neighbors(&self) -> Vec<&ShapeId> {
        match self {
            ShapeKind::List { member } | ShapeKind::Set { member } => vec![member],
            ShapeKind::Map { key, value } => vec![key, value],
            ShapeKind::Structure { members } | ShapeKind::Union { members } => {
                members.iter().collect()
            }
            ShapeKind::Member { target } => vec![target],
            ShapeKind::Operation {
                input,
                output,
                errors,
            } => input
                .iter()
                .chain(output.iter())
                .chain(errors.iter())
                .collect(),
            ShapeKind::Resource {
                identifiers,
                lifecycle,
                operations,
                resources,
            } => identifiers
                .iter()
                .map(|(_, target)| target)
                .chain(lifecycle.iter())
                .chain(operations.iter())
                .chain(resources.iter())
                .collect(),
            ShapeKind::Service {
                operations,
                resources,
            } => operations.iter().chain(resources.iter()).collect(),
            _ => Vec::new(),
        }
    }
}

/// A named node of the shape graph
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub traits: Traits,
}

impl Shape {
    pub fn new(id: ShapeId, kind: ShapeKind) -> Self {
        Self {
            id,
            kind,
            traits: Traits::new(),
        }
    }

    /// Add a trait, replacing any previous value with the same name
    pub fn with_trait(mut self, name: &str, value: serde_json::Value) -> Self {
        self.traits.insert(name.to_string(), value);
        self
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.contains_key(name)
    }

    pub fn get_trait(&self, name: &str) -> Option<&serde_json::Value> {
        self.traits.get(name)
    }

    /// String value of a trait such as `documentation`
    pub fn string_trait(&self, name: &str) -> Option<&str> {
        self.get_trait(name).and_then(|v| v.as_str())
    }

    /// Target of a member shape
    pub fn target(&self) -> Option<&ShapeId> {
        match &self.kind {
            ShapeKind::Member { target } => Some(target),
            _ => None,
        }
    }

    /// Member IDs of structures and unions
    pub fn members(&self) -> &[ShapeId] {
        match &self.kind {
            ShapeKind::Structure { members } | ShapeKind::Union { members } => members,
            _ => &[],
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(self.kind, ShapeKind::Member { .. })
    }
}
