//! JSON Schema conversion for shape graphs
//!
//! Converting a graph happens in two passes. The first walks the shapes
//! reachable from the requested roots and assigns each included shape a
//! unique pointer. The second builds one definition per shape, referring to
//! every nested type through those pointers.
//!
//! ```no_run
//! use shape_schema_jsonschema::{JsonSchemaConfig, JsonSchemaConverter};
//!
//! # fn main() -> shape_schema_common::Result<()> {
//! let graph = shape_schema_common::ShapeGraph::builder()
//!     .string("com.example#Name")
//!     .structure("com.example#Person", &[("name", "com.example#Name")])
//!     .build()?;
//!
//! let converter = JsonSchemaConverter::new(JsonSchemaConfig::default())?;
//! let document = converter.convert_shape(&graph, &"com.example#Person".parse()?)?;
//! println!("{}", document.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod converter;
pub mod document;
pub mod mapper;
pub mod pointer;
pub mod schema;
pub mod walker;

pub use config::{JsonSchemaConfig, TimestampFormat, UnionStrategy};
pub use converter::JsonSchemaConverter;
pub use document::SchemaDocument;
pub use mapper::{DisableKeywordsMapper, SchemaMapper, TraitMapper};
pub use pointer::{PointerAssigner, PointerTable};
pub use schema::Schema;
pub use walker::Walker;

use shape_schema_common::{Result, ShapeGraph};

/// Convert a whole graph with the given settings
pub fn convert_graph(graph: &ShapeGraph, config: JsonSchemaConfig) -> Result<SchemaDocument> {
    JsonSchemaConverter::new(config)?.convert(graph)
}
