//! Smithy JSON AST loader
//!
//! Parses Smithy JSON AST documents into a `ShapeGraph`.
//!
//! ## Format
//! A Smithy JSON AST document contains:
//! - A `smithy` version string
//! - A `shapes` object keyed by absolute shape ID
//! - Optional `metadata`
//!
//! Member order inside `members` objects is preserved, since it drives the
//! traversal order of the converters.
//!
//! ## Usage
//! ```rust,ignore
//! use shape_schema_parser::smithy::SmithyParser;
//!
//! let parser = SmithyParser::from_file("model/weather.json")?;
//! let graph = parser.parse()?;
//! ```

mod converter;
mod ordered;
mod parser;
mod types;

pub use parser::SmithyParser;
pub use types::*;
