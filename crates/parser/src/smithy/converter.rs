//! Converts a Smithy model into a `ShapeGraph`

use super::types::{Member, Shape, ShapeReference, SmithyModel, TraitMap};
use serde_json::{json, Value};
use shape_schema_common::{
    traits, Result, SchemaError, Shape as GraphShape, ShapeGraph, ShapeId, ShapeKind,
};
use std::collections::BTreeSet;
use tracing::debug;

/// Convert Smithy model to ShapeGraph
pub fn convert_smithy_to_shape_graph(model: &SmithyModel) -> Result<ShapeGraph> {
    let mut graph = ShapeGraph::new();

    for (shape_id, shape) in &model.shapes {
        let id: ShapeId = shape_id.parse()?;
        if id.is_member() {
            return Err(SchemaError::Parse(format!(
                "Member ID `{}` cannot be defined at the top level",
                id
            )));
        }
        for converted in convert_shape(&id, shape)? {
            graph.insert(converted);
        }
    }

    let synthesized = add_prelude_shapes(&mut graph);
    debug!(
        shapes = graph.len(),
        prelude = synthesized,
        "Converted Smithy model"
    );

    Ok(graph)
}

/// Convert one AST shape into the graph shape plus any member shapes it owns
fn convert_shape(id: &ShapeId, shape: &Shape) -> Result<Vec<GraphShape>> {
    let mut owned = Vec::new();

    let (kind, traits) = match shape {
        Shape::Service {
            operations,
            resources,
            traits,
            ..
        } => (
            ShapeKind::Service {
                operations: references(operations)?,
                resources: references(resources)?,
            },
            traits,
        ),
        Shape::Operation {
            input,
            output,
            errors,
            traits,
        } => (
            ShapeKind::Operation {
                input: input.as_ref().map(reference).transpose()?,
                output: output.as_ref().map(reference).transpose()?,
                errors: references(errors)?,
            },
            traits,
        ),
        Shape::Resource {
            identifiers,
            create,
            put,
            read,
            update,
            delete,
            list,
            operations,
            collection_operations,
            resources,
            traits,
        } => {
            let identifiers = identifiers
                .iter()
                .map(|(name, target)| Ok((name.clone(), reference(target)?)))
                .collect::<Result<Vec<_>>>()?;
            let lifecycle = [create, put, read, update, delete, list]
                .into_iter()
                .flatten()
                .map(reference)
                .collect::<Result<Vec<_>>>()?;
            let mut bound = references(operations)?;
            bound.extend(references(collection_operations)?);
            (
                ShapeKind::Resource {
                    identifiers,
                    lifecycle,
                    operations: bound,
                    resources: references(resources)?,
                },
                traits,
            )
        }
        Shape::Structure { members, traits } => {
            let members = convert_members(id, members, &mut owned)?;
            (ShapeKind::Structure { members }, traits)
        }
        Shape::Union { members, traits } => {
            let members = convert_members(id, members, &mut owned)?;
            (ShapeKind::Union { members }, traits)
        }
        Shape::Enum { members, traits } => {
            let shape = GraphShape {
                id: id.clone(),
                kind: ShapeKind::String,
                traits: with_enum_trait(traits, enum_values(id, members, false)?),
            };
            return Ok(vec![shape]);
        }
        Shape::IntEnum { members, traits } => {
            let shape = GraphShape {
                id: id.clone(),
                kind: ShapeKind::Integer,
                traits: with_enum_trait(traits, enum_values(id, members, true)?),
            };
            return Ok(vec![shape]);
        }
        Shape::List { member, traits } => {
            let member = convert_member(id, "member", member, &mut owned)?;
            (ShapeKind::List { member }, traits)
        }
        Shape::Set { member, traits } => {
            let member = convert_member(id, "member", member, &mut owned)?;
            (ShapeKind::Set { member }, traits)
        }
        Shape::Map { key, value, traits } => {
            let key = convert_member(id, "key", key, &mut owned)?;
            let value = convert_member(id, "value", value, &mut owned)?;
            (ShapeKind::Map { key, value }, traits)
        }
        Shape::Blob { traits } => (ShapeKind::Blob, traits),
        Shape::Boolean { traits } => (ShapeKind::Boolean, traits),
        Shape::String { traits } => (ShapeKind::String, traits),
        Shape::Byte { traits } => (ShapeKind::Byte, traits),
        Shape::Short { traits } => (ShapeKind::Short, traits),
        Shape::Integer { traits } => (ShapeKind::Integer, traits),
        Shape::Long { traits } => (ShapeKind::Long, traits),
        Shape::Float { traits } => (ShapeKind::Float, traits),
        Shape::Double { traits } => (ShapeKind::Double, traits),
        Shape::BigInteger { traits } => (ShapeKind::BigInteger, traits),
        Shape::BigDecimal { traits } => (ShapeKind::BigDecimal, traits),
        Shape::Timestamp { traits } => (ShapeKind::Timestamp, traits),
        Shape::Document { traits } => (ShapeKind::Document, traits),
        Shape::Other => {
            return Err(SchemaError::Parse(format!(
                "Shape `{}` has an unsupported type",
                id
            )))
        }
    };

    owned.push(GraphShape {
        id: id.clone(),
        kind,
        traits: traits.clone(),
    });

    Ok(owned)
}

fn convert_members(
    container: &ShapeId,
    members: &[(String, Member)],
    owned: &mut Vec<GraphShape>,
) -> Result<Vec<ShapeId>> {
    members
        .iter()
        .map(|(name, member)| convert_member(container, name, member, owned))
        .collect()
}

fn convert_member(
    container: &ShapeId,
    name: &str,
    member: &Member,
    owned: &mut Vec<GraphShape>,
) -> Result<ShapeId> {
    let id = container.with_member(name)?;
    owned.push(GraphShape {
        id: id.clone(),
        kind: ShapeKind::Member {
            target: member.target.parse()?,
        },
        traits: member.traits.clone(),
    });
    Ok(id)
}

/// Build `smithy.api#enum` entries from Smithy 2.0 enum members
///
/// String enums default each value to the member name; integer enums
/// require an explicit `enumValue`.
fn enum_values(id: &ShapeId, members: &[(String, Member)], integer: bool) -> Result<Vec<Value>> {
    members
        .iter()
        .map(|(name, member)| {
            let value = match member.traits.get(traits::ENUM_VALUE) {
                Some(value) if integer && value.is_i64() => value.clone(),
                Some(value) if !integer && value.is_string() => value.clone(),
                None if !integer => Value::String(name.clone()),
                _ => {
                    return Err(SchemaError::Parse(format!(
                        "Enum member `{}${}` has an invalid enumValue",
                        id, name
                    )))
                }
            };
            Ok(json!({ "name": name, "value": value }))
        })
        .collect()
}

fn with_enum_trait(traits: &TraitMap, values: Vec<Value>) -> TraitMap {
    let mut traits = traits.clone();
    traits.insert(traits::ENUM.to_string(), Value::Array(values));
    traits
}

fn reference(reference: &ShapeReference) -> Result<ShapeId> {
    reference.target.parse()
}

fn references(references: &[ShapeReference]) -> Result<Vec<ShapeId>> {
    references.iter().map(reference).collect()
}

/// Add prelude shapes that are referenced but not defined by the model
fn add_prelude_shapes(graph: &mut ShapeGraph) -> usize {
    let missing: BTreeSet<ShapeId> = graph
        .shapes()
        .flat_map(|shape| shape.kind.neighbors())
        .filter(|id| id.namespace() == traits::PRELUDE_NAMESPACE && !graph.contains(id))
        .cloned()
        .collect();

    let mut added = 0;
    for id in missing {
        if let Some(kind) = prelude_kind(id.name()) {
            graph.insert(GraphShape::new(id, kind));
            added += 1;
        }
    }
    added
}

fn prelude_kind(name: &str) -> Option<ShapeKind> {
    let kind = match name {
        "Blob" => ShapeKind::Blob,
        "Boolean" | "PrimitiveBoolean" => ShapeKind::Boolean,
        "String" => ShapeKind::String,
        "Byte" | "PrimitiveByte" => ShapeKind::Byte,
        "Short" | "PrimitiveShort" => ShapeKind::Short,
        "Integer" | "PrimitiveInteger" => ShapeKind::Integer,
        "Long" | "PrimitiveLong" => ShapeKind::Long,
        "Float" | "PrimitiveFloat" => ShapeKind::Float,
        "Double" | "PrimitiveDouble" => ShapeKind::Double,
        "BigInteger" => ShapeKind::BigInteger,
        "BigDecimal" => ShapeKind::BigDecimal,
        "Timestamp" => ShapeKind::Timestamp,
        "Document" => ShapeKind::Document,
        "Unit" => ShapeKind::Structure {
            members: Vec::new(),
        },
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_kind() {
        assert_eq!(prelude_kind("String"), Some(ShapeKind::String));
        assert_eq!(prelude_kind("PrimitiveLong"), Some(ShapeKind::Long));
        assert!(matches!(
            prelude_kind("Unit"),
            Some(ShapeKind::Structure { .. })
        ));
        assert_eq!(prelude_kind("Widget"), None);
    }

    #[test]
    fn test_enum_values_default_to_member_names() {
        let id: ShapeId = "com.example#Color".parse().unwrap();
        let members = vec![
            (
                "RED".to_string(),
                Member {
                    target: "smithy.api#Unit".to_string(),
                    traits: TraitMap::new(),
                },
            ),
            (
                "GREEN".to_string(),
                Member {
                    target: "smithy.api#Unit".to_string(),
                    traits: [(traits::ENUM_VALUE.to_string(), json!("green"))]
                        .into_iter()
                        .collect(),
                },
            ),
        ];

        let values = enum_values(&id, &members, false).unwrap();
        assert_eq!(values[0]["value"], json!("RED"));
        assert_eq!(values[1]["value"], json!("green"));
        assert!(enum_values(&id, &members, true).is_err());
    }
}
