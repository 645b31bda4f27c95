//! CloudFormation resource schemas
//!
//! A resource schema is a JSON Schema with a few extra rules: definitions
//! live under `#/definitions` with alphanumeric names, the resource's
//! properties sit at the top level, and objects do not accept properties
//! they do not declare.

pub mod config;
pub mod resource;

pub use config::CfnConfig;
pub use resource::{inject_additional_properties, ResourceSchema, ResourceSchemaBuilder};
