//! Common types and utilities for shape-schema
//!
//! This crate contains the in-memory shape graph consumed by the converters,
//! the trait names they understand, and the error type shared by every
//! crate in the workspace.

mod graph;
mod shape;
pub mod traits;

pub use graph::{ShapeGraph, ShapeGraphBuilder};
pub use shape::{Shape, ShapeId, ShapeKind, Traits};

use thiserror::Error;

/// Errors that can occur while loading or converting a shape graph
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Parse error: {0}")]
    Parse(String),

    /// Two distinct shapes would be written to the same pointer
    #[error("Conflicting pointer `{pointer}` generated for shapes `{first}` and `{second}`")]
    ConflictingName {
        pointer: String,
        first: ShapeId,
        second: ShapeId,
    },

    /// A shape refers to a shape that is not part of the graph
    #[error("Unable to find shape `{target}` referenced by {referrer}")]
    UnresolvedReference { referrer: String, target: ShapeId },

    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Build an `UnresolvedReference` error for a shape referenced by another shape
    pub fn unresolved(referrer: &ShapeId, target: &ShapeId) -> Self {
        SchemaError::UnresolvedReference {
            referrer: format!("`{}`", referrer),
            target: target.clone(),
        }
    }
}

/// Result type for shape-schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_name_message() {
        let err = SchemaError::ConflictingName {
            pointer: "#/definitions/Foo".to_string(),
            first: "com.a#Foo".parse().unwrap(),
            second: "com.b#Foo".parse().unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Conflicting pointer `#/definitions/Foo` generated for shapes `com.a#Foo` and `com.b#Foo`"
        );
    }

    #[test]
    fn test_unresolved_message() {
        let err = SchemaError::unresolved(
            &"com.a#Foo$bar".parse().unwrap(),
            &"com.a#Missing".parse().unwrap(),
        );
        assert!(err.to_string().contains("com.a#Missing"));
        assert!(err.to_string().contains("`com.a#Foo$bar`"));
    }
}
