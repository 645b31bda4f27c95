//! Model loading for shape-schema
//!
//! The converters work on an in-memory `ShapeGraph`. This crate builds that
//! graph from Smithy JSON AST documents:
//!
//! - Every top-level shape becomes a graph node
//! - Aggregate members become member nodes (`ns#Shape$member`) in declared order
//! - Smithy 2.0 `enum`/`intEnum` shapes become string/integer shapes carrying
//!   the `smithy.api#enum` trait
//! - Prelude shapes (`smithy.api#String`, `smithy.api#Unit`, ...) that are
//!   referenced but not defined are synthesized

pub mod smithy;

pub use smithy::SmithyParser;

use shape_schema_common::{Result, ShapeGraph};
use std::path::Path;

/// Load a Smithy JSON AST file into a shape graph
///
/// # Arguments
/// * `path` - Path to the JSON AST file
///
/// # Returns
/// * `ShapeGraph` - All shapes defined by the model plus referenced prelude shapes
pub fn load_smithy_model<P: AsRef<Path>>(path: P) -> Result<ShapeGraph> {
    SmithyParser::from_file(path)?.parse()
}
