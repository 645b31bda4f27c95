//! Pointer assignment and name deconfliction
//!
//! Every shape that gets a definition is given a JSON pointer made of the
//! definition prefix and a local name. Local names start out short (the
//! shape name) and shapes whose names collide are qualified with their
//! namespace until every pointer is unique.

use crate::config::JsonSchemaConfig;
use shape_schema_common::{Result, SchemaError, Shape, ShapeId};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Pointers assigned to the shapes of one conversion
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointerTable {
    prefix: String,
    pointers: BTreeMap<ShapeId, String>,
}

impl PointerTable {
    /// Definition prefix every pointer starts with
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn get(&self, id: &ShapeId) -> Option<&str> {
        self.pointers.get(id).map(String::as_str)
    }

    /// Pointer of a shape that must have one
    pub fn pointer(&self, id: &ShapeId) -> Result<&str> {
        self.get(id).ok_or_else(|| SchemaError::UnresolvedReference {
            referrer: "the pointer table".to_string(),
            target: id.clone(),
        })
    }

    /// Pointer without the definition prefix
    pub fn local_name(&self, id: &ShapeId) -> Option<&str> {
        self.get(id)
            .and_then(|pointer| pointer.strip_prefix(&self.prefix))
            .and_then(|rest| rest.strip_prefix('/'))
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.pointers.contains_key(id)
    }

    /// Entries in shape ID order
    pub fn iter(&self) -> impl Iterator<Item = (&ShapeId, &str)> {
        self.pointers.iter().map(|(id, p)| (id, p.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }
}

/// Assigns unique pointers to a set of shapes
pub struct PointerAssigner<'a> {
    config: &'a JsonSchemaConfig,
}

struct Candidate<'s> {
    id: &'s ShapeId,
    name: String,
    qualified: bool,
}

impl<'a> PointerAssigner<'a> {
    pub fn new(config: &'a JsonSchemaConfig) -> Self {
        Self { config }
    }

    /// Assign a pointer to every shape
    ///
    /// The outcome depends only on the set of shapes, never on their order.
    /// When shapes share a name, all of them get the namespace-qualified
    /// form. Shapes that still collide once qualified are an error.
    pub fn assign(&self, shapes: &[&Shape]) -> Result<PointerTable> {
        let mut candidates: Vec<Candidate> = shapes
            .iter()
            .map(|shape| Candidate {
                id: &shape.id,
                name: self.candidate_name(&shape.id),
                qualified: false,
            })
            .collect();
        candidates.sort_by(|a, b| a.id.cmp(b.id));
        candidates.dedup_by(|a, b| a.id == b.id);

        let mut round = 0;
        loop {
            let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
            for (index, candidate) in candidates.iter().enumerate() {
                groups.entry(&candidate.name).or_default().push(index);
            }

            let conflicts: Vec<Vec<usize>> = groups
                .into_values()
                .filter(|group| group.len() > 1)
                .collect();
            if conflicts.is_empty() {
                break;
            }

            round += 1;
            for group in conflicts {
                self.qualify_group(&mut candidates, &group)?;
            }
            trace!(round, "Re-grouped conflicting local names");
        }

        let prefix = self.config.definition_prefix().to_string();
        let pointers: BTreeMap<ShapeId, String> = candidates
            .into_iter()
            .map(|c| (c.id.clone(), format!("{}/{}", prefix, c.name)))
            .collect();

        debug!(
            pointers = pointers.len(),
            rounds = round,
            "Assigned definition pointers"
        );

        Ok(PointerTable { prefix, pointers })
    }

    /// Qualify every unqualified member of a conflict group
    ///
    /// Group indices are in shape ID order, so the reported pair is stable.
    fn qualify_group(&self, candidates: &mut [Candidate], group: &[usize]) -> Result<()> {
        let qualified: Vec<usize> = group
            .iter()
            .copied()
            .filter(|&index| candidates[index].qualified)
            .collect();

        if let [first, second, ..] = qualified[..] {
            return Err(SchemaError::ConflictingName {
                pointer: format!(
                    "{}/{}",
                    self.config.definition_prefix(),
                    candidates[first].name
                ),
                first: candidates[first].id.clone(),
                second: candidates[second].id.clone(),
            });
        }

        for &index in group {
            let candidate = &mut candidates[index];
            if candidate.qualified {
                continue;
            }
            let name = format!(
                "{}{}",
                candidate.name,
                namespace_suffix(candidate.id.namespace())
            );
            candidate.name = self.clean(name);
            candidate.qualified = true;
        }

        Ok(())
    }

    /// Short local name of a shape before deconfliction
    pub fn candidate_name(&self, id: &ShapeId) -> String {
        self.clean(self.base_name(id))
    }

    fn base_name(&self, id: &ShapeId) -> String {
        let shape_name = if self.config.preserve_namespaces {
            format!("{}{}", namespace_suffix(id.namespace()), capitalize(id.name()))
        } else {
            id.name().to_string()
        };

        match id.member() {
            Some(member) => format!("{}{}Member", shape_name, capitalize(member)),
            None => shape_name,
        }
    }

    fn clean(&self, name: String) -> String {
        if self.config.alphanumeric_only_pointers {
            name.chars().filter(char::is_ascii_alphanumeric).collect()
        } else {
            name
        }
    }
}

/// `com.example` becomes `ComExample`
fn namespace_suffix(namespace: &str) -> String {
    namespace.split('.').map(capitalize).collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
