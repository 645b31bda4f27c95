//! In-memory shape graph

use crate::{Result, SchemaError, Shape, ShapeId, ShapeKind};
use std::collections::BTreeMap;

/// A graph of shapes keyed by their absolute IDs
///
/// Aggregate shapes own their member shapes, which are stored in the graph
/// next to them. Member targets are plain references and may form cycles.
/// Iteration follows `ShapeId` order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeGraph {
    shapes: BTreeMap<ShapeId, Shape>,
}

impl ShapeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start building a graph from string shape IDs
    pub fn builder() -> ShapeGraphBuilder {
        ShapeGraphBuilder::default()
    }

    /// Insert a shape, returning the shape previously stored under its ID
    pub fn insert(&mut self, shape: Shape) -> Option<Shape> {
        self.shapes.insert(shape.id.clone(), shape)
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.shapes.contains_key(id)
    }

    /// Look up a shape that `referrer` points at
    pub fn expect(&self, referrer: &ShapeId, id: &ShapeId) -> Result<&Shape> {
        self.get(id)
            .ok_or_else(|| SchemaError::unresolved(referrer, id))
    }

    /// Resolve the target of a member shape
    pub fn member_target(&self, member: &Shape) -> Result<Option<&Shape>> {
        match member.target() {
            Some(target) => self.expect(&member.id, target).map(Some),
            None => Ok(None),
        }
    }

    /// Shape that contains the given member
    pub fn container_of(&self, member: &ShapeId) -> Option<&Shape> {
        if member.is_member() {
            self.get(&member.container())
        } else {
            None
        }
    }

    /// All shapes in ID order
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    /// All shape IDs in ID order
    pub fn ids(&self) -> impl Iterator<Item = &ShapeId> {
        self.shapes.keys()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Check that every edge of the graph points at a shape in the graph
    pub fn validate(&self) -> Result<()> {
        for shape in self.shapes() {
            for neighbor in shape.kind.neighbors() {
                self.expect(&shape.id, neighbor)?;
            }
        }
        Ok(())
    }
}

/// Builds a `ShapeGraph` from string shape IDs
///
/// The first invalid ID is remembered and reported by `build`, so a chain of
/// calls never panics.
#[derive(Debug, Default)]
pub struct ShapeGraphBuilder {
    graph: ShapeGraph,
    last: Option<ShapeId>,
    error: Option<SchemaError>,
}

impl ShapeGraphBuilder {
    /// Add a shape that was built elsewhere
    pub fn shape(mut self, shape: Shape) -> Self {
        self.last = Some(shape.id.clone());
        self.graph.insert(shape);
        self
    }

    /// Add a shape without members
    pub fn simple(self, id: &str, kind: ShapeKind) -> Self {
        self.add(id, |_| Ok((kind, Vec::new())))
    }

    pub fn string(self, id: &str) -> Self {
        self.simple(id, ShapeKind::String)
    }

    pub fn integer(self, id: &str) -> Self {
        self.simple(id, ShapeKind::Integer)
    }

    pub fn boolean(self, id: &str) -> Self {
        self.simple(id, ShapeKind::Boolean)
    }

    pub fn timestamp(self, id: &str) -> Self {
        self.simple(id, ShapeKind::Timestamp)
    }

    pub fn list(self, id: &str, target: &str) -> Self {
        self.add(id, |id| {
            let member = member(id, "member", target)?;
            Ok((
                ShapeKind::List {
                    member: member.id.clone(),
                },
                vec![member],
            ))
        })
    }

    pub fn set(self, id: &str, target: &str) -> Self {
        self.add(id, |id| {
            let member = member(id, "member", target)?;
            Ok((
                ShapeKind::Set {
                    member: member.id.clone(),
                },
                vec![member],
            ))
        })
    }

    pub fn map(self, id: &str, key: &str, value: &str) -> Self {
        self.add(id, |id| {
            let key = member(id, "key", key)?;
            let value = member(id, "value", value)?;
            Ok((
                ShapeKind::Map {
                    key: key.id.clone(),
                    value: value.id.clone(),
                },
                vec![key, value],
            ))
        })
    }

    /// Add a structure whose members are `(name, target)` pairs in declared order
    pub fn structure(self, id: &str, members: &[(&str, &str)]) -> Self {
        self.add(id, |id| {
            let members = aggregate_members(id, members)?;
            Ok((
                ShapeKind::Structure {
                    members: members.iter().map(|m| m.id.clone()).collect(),
                },
                members,
            ))
        })
    }

    pub fn union(self, id: &str, members: &[(&str, &str)]) -> Self {
        self.add(id, |id| {
            let members = aggregate_members(id, members)?;
            Ok((
                ShapeKind::Union {
                    members: members.iter().map(|m| m.id.clone()).collect(),
                },
                members,
            ))
        })
    }

    pub fn operation(self, id: &str, input: Option<&str>, output: Option<&str>) -> Self {
        self.add(id, |_| {
            Ok((
                ShapeKind::Operation {
                    input: input.map(str::parse::<ShapeId>).transpose()?,
                    output: output.map(str::parse::<ShapeId>).transpose()?,
                    errors: Vec::new(),
                },
                Vec::new(),
            ))
        })
    }

    pub fn service(self, id: &str, operations: &[&str]) -> Self {
        self.add(id, |_| {
            Ok((
                ShapeKind::Service {
                    operations: operations
                        .iter()
                        .map(|op| op.parse::<ShapeId>())
                        .collect::<Result<Vec<_>>>()?,
                    resources: Vec::new(),
                },
                Vec::new(),
            ))
        })
    }

    /// Attach a trait to the most recently added shape
    pub fn with_trait(mut self, name: &str, value: serde_json::Value) -> Self {
        if let Some(shape) = self.last.as_ref().and_then(|id| self.graph.shapes.get_mut(id)) {
            shape.traits.insert(name.to_string(), value);
        }
        self
    }

    /// Attach a trait to any shape already added, including members
    pub fn trait_on(mut self, id: &str, name: &str, value: serde_json::Value) -> Self {
        match id.parse::<ShapeId>() {
            Ok(id) => match self.graph.shapes.get_mut(&id) {
                Some(shape) => {
                    shape.traits.insert(name.to_string(), value);
                }
                None => self.record(SchemaError::Parse(format!(
                    "Cannot apply trait `{}` to unknown shape `{}`",
                    name, id
                ))),
            },
            Err(e) => self.record(e),
        }
        self
    }

    pub fn build(self) -> Result<ShapeGraph> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.graph),
        }
    }

    fn add<F>(mut self, id: &str, make: F) -> Self
    where
        F: FnOnce(&ShapeId) -> Result<(ShapeKind, Vec<Shape>)>,
    {
        let result = id
            .parse::<ShapeId>()
            .and_then(|id| make(&id).map(|made| (id, made)));

        match result {
            Ok((id, (kind, members))) => {
                for member in members {
                    self.graph.insert(member);
                }
                self.last = Some(id.clone());
                self.graph.insert(Shape::new(id, kind));
            }
            Err(e) => self.record(e),
        }
        self
    }

    fn record(&mut self, error: SchemaError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

fn member(container: &ShapeId, name: &str, target: &str) -> Result<Shape> {
    Ok(Shape::new(
        container.with_member(name)?,
        ShapeKind::Member {
            target: target.parse()?,
        },
    ))
}

fn aggregate_members(container: &ShapeId, members: &[(&str, &str)]) -> Result<Vec<Shape>> {
    members
        .iter()
        .map(|(name, target)| member(container, name, target))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_creates_member_shapes() {
        let graph = ShapeGraph::builder()
            .string("com.example#Name")
            .structure(
                "com.example#Widget",
                &[("name", "com.example#Name"), ("next", "com.example#Widget")],
            )
            .build()
            .unwrap();

        assert_eq!(graph.len(), 4);
        let widget = graph.get(&"com.example#Widget".parse().unwrap()).unwrap();
        let names: Vec<&str> = widget
            .members()
            .iter()
            .filter_map(|m| m.member())
            .collect();
        assert_eq!(names, vec!["name", "next"]);

        let next = graph
            .get(&"com.example#Widget$next".parse().unwrap())
            .unwrap();
        assert_eq!(next.target().unwrap().to_string(), "com.example#Widget");
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_builder_traits() {
        let graph = ShapeGraph::builder()
            .string("com.example#Name")
            .with_trait(crate::traits::DOCUMENTATION, json!("A name"))
            .structure("com.example#Widget", &[("name", "com.example#Name")])
            .trait_on("com.example#Widget$name", crate::traits::REQUIRED, json!({}))
            .build()
            .unwrap();

        let name = graph.get(&"com.example#Name".parse().unwrap()).unwrap();
        assert_eq!(
            name.string_trait(crate::traits::DOCUMENTATION),
            Some("A name")
        );
        let member = graph
            .get(&"com.example#Widget$name".parse().unwrap())
            .unwrap();
        assert!(member.has_trait(crate::traits::REQUIRED));
    }

    #[test]
    fn test_builder_reports_first_error() {
        let result = ShapeGraph::builder()
            .string("not-a-shape-id")
            .string("com.example#Ok")
            .build();
        assert!(matches!(result, Err(SchemaError::Parse(_))));
    }

    #[test]
    fn test_validate_reports_missing_target() {
        let graph = ShapeGraph::builder()
            .list("com.example#Names", "com.example#Missing")
            .build()
            .unwrap();

        match graph.validate() {
            Err(SchemaError::UnresolvedReference { target, .. }) => {
                assert_eq!(target.to_string(), "com.example#Missing");
            }
            other => panic!("expected unresolved reference, got {:?}", other),
        }
    }

    #[test]
    fn test_container_of_member() {
        let graph = ShapeGraph::builder()
            .string("com.example#S")
            .list("com.example#L", "com.example#S")
            .build()
            .unwrap();
        let container = graph
            .container_of(&"com.example#L$member".parse().unwrap())
            .unwrap();
        assert_eq!(container.id.to_string(), "com.example#L");
        assert!(graph
            .container_of(&"com.example#L".parse().unwrap())
            .is_none());
    }
}
