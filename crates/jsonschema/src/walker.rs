//! Deterministic traversal of a shape graph

use shape_schema_common::{Result, SchemaError, Shape, ShapeGraph, ShapeId};
use std::collections::BTreeSet;

/// Enumerates the shapes reachable from a set of roots
///
/// The walk is a depth-first pre-order that visits roots in the order given
/// and neighbors in declared order. It uses an explicit stack, so deep or
/// cyclic graphs are safe, and each shape is returned once.
pub struct Walker<'a> {
    graph: &'a ShapeGraph,
}

impl<'a> Walker<'a> {
    pub fn new(graph: &'a ShapeGraph) -> Self {
        Self { graph }
    }

    /// Walk everything reachable from `roots`
    pub fn walk(&self, roots: &[ShapeId]) -> Result<Vec<&'a Shape>> {
        let mut visited = BTreeSet::new();
        let mut ordered = Vec::new();
        let mut stack: Vec<(&ShapeId, Option<&ShapeId>)> =
            roots.iter().rev().map(|root| (root, None)).collect();

        while let Some((id, referrer)) = stack.pop() {
            if visited.contains(id) {
                continue;
            }

            let shape = match (self.graph.get(id), referrer) {
                (Some(shape), _) => shape,
                (None, Some(referrer)) => return Err(SchemaError::unresolved(referrer, id)),
                (None, None) => {
                    return Err(SchemaError::UnresolvedReference {
                        referrer: "the conversion roots".to_string(),
                        target: id.clone(),
                    })
                }
            };

            visited.insert(id);
            ordered.push(shape);

            let neighbors = shape.kind.neighbors();
            stack.extend(
                neighbors
                    .into_iter()
                    .rev()
                    .filter(|neighbor| !visited.contains(*neighbor))
                    .map(|neighbor| (neighbor, Some(&shape.id))),
            );
        }

        Ok(ordered)
    }

    /// Walk every shape of the graph, using each shape in ID order as a root
    pub fn walk_all(&self) -> Result<Vec<&'a Shape>> {
        let roots: Vec<ShapeId> = self.graph.ids().cloned().collect();
        self.walk(&roots)
    }

    /// Walk from `roots` and keep the shapes accepted by `keep`
    ///
    /// Filtering happens after the walk, so a rejected shape still leads the
    /// walk to its neighbors.
    pub fn walk_filtered<F>(&self, roots: &[ShapeId], keep: F) -> Result<Vec<&'a Shape>>
    where
        F: Fn(&Shape) -> bool,
    {
        Ok(self
            .walk(roots)?
            .into_iter()
            .filter(|shape| keep(shape))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shape_schema_common::ShapeKind;

    fn id(s: &str) -> ShapeId {
        s.parse().unwrap()
    }

    fn ids(shapes: &[&Shape]) -> Vec<String> {
        shapes.iter().map(|s| s.id.to_string()).collect()
    }

    #[test]
    fn test_preorder_follows_declared_order() {
        let graph = ShapeGraph::builder()
            .string("ex#S")
            .integer("ex#I")
            .structure("ex#Root", &[("b", "ex#S"), ("a", "ex#I")])
            .build()
            .unwrap();

        let walked = Walker::new(&graph).walk(&[id("ex#Root")]).unwrap();
        assert_eq!(
            ids(&walked),
            vec!["ex#Root", "ex#Root$b", "ex#S", "ex#Root$a", "ex#I"]
        );
    }

    #[test]
    fn test_cycles_visit_each_shape_once() {
        let graph = ShapeGraph::builder()
            .structure("ex#Node", &[("next", "ex#Node")])
            .build()
            .unwrap();

        let walked = Walker::new(&graph).walk(&[id("ex#Node")]).unwrap();
        assert_eq!(ids(&walked), vec!["ex#Node", "ex#Node$next"]);
    }

    #[test]
    fn test_missing_target_is_unresolved() {
        let graph = ShapeGraph::builder()
            .list("ex#L", "ex#Missing")
            .build()
            .unwrap();

        match Walker::new(&graph).walk(&[id("ex#L")]) {
            Err(SchemaError::UnresolvedReference { referrer, target }) => {
                assert_eq!(referrer, "`ex#L$member`");
                assert_eq!(target, id("ex#Missing"));
            }
            other => panic!("expected unresolved reference, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_root_is_unresolved() {
        let graph = ShapeGraph::new();
        assert!(matches!(
            Walker::new(&graph).walk(&[id("ex#Nope")]),
            Err(SchemaError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn test_filtered_shapes_do_not_block_the_walk() {
        let graph = ShapeGraph::builder()
            .string("ex#Leaf")
            .list("ex#Hidden", "ex#Leaf")
            .structure("ex#Root", &[("h", "ex#Hidden")])
            .build()
            .unwrap();

        let walked = Walker::new(&graph)
            .walk_filtered(&[id("ex#Root")], |shape| shape.id != id("ex#Hidden"))
            .unwrap();
        assert!(ids(&walked).contains(&"ex#Leaf".to_string()));
        assert!(!ids(&walked).contains(&"ex#Hidden".to_string()));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let mut builder = ShapeGraph::builder().string("ex#S0");
        for i in 1..5000 {
            builder = builder.list(&format!("ex#S{}", i), &format!("ex#S{}", i - 1));
        }
        let graph = builder.build().unwrap();

        let walked = Walker::new(&graph).walk(&[id("ex#S4999")]).unwrap();
        // Every list plus its member, and the final string
        assert_eq!(walked.len(), 4999 * 2 + 1);
        assert_eq!(walked.last().unwrap().kind, ShapeKind::String);
    }

    #[test]
    fn test_walk_all_includes_unreachable_shapes() {
        let graph = ShapeGraph::builder()
            .string("ex#B")
            .string("ex#A")
            .build()
            .unwrap();

        assert_eq!(
            ids(&Walker::new(&graph).walk_all().unwrap()),
            vec!["ex#A", "ex#B"]
        );
    }
}
