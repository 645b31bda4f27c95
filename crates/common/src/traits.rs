//! Trait names understood by the converters

pub const DOCUMENTATION: &str = "smithy.api#documentation";
pub const TITLE: &str = "smithy.api#title";
pub const MEDIA_TYPE: &str = "smithy.api#mediaType";
pub const PATTERN: &str = "smithy.api#pattern";
pub const RANGE: &str = "smithy.api#range";
pub const LENGTH: &str = "smithy.api#length";
pub const UNIQUE_ITEMS: &str = "smithy.api#uniqueItems";
pub const ENUM: &str = "smithy.api#enum";
pub const ENUM_VALUE: &str = "smithy.api#enumValue";
pub const REQUIRED: &str = "smithy.api#required";
pub const PRIVATE: &str = "smithy.api#private";
pub const JSON_NAME: &str = "smithy.api#jsonName";
pub const TIMESTAMP_FORMAT: &str = "smithy.api#timestampFormat";

/// Namespace of the built-in prelude shapes
pub const PRELUDE_NAMESPACE: &str = "smithy.api";
