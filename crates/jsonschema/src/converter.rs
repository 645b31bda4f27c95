//! Flattens a shape graph into a JSON Schema document

use crate::config::{JsonSchemaConfig, TimestampFormat, UnionStrategy};
use crate::document::SchemaDocument;
use crate::mapper::{DisableKeywordsMapper, SchemaMapper, TraitMapper};
use crate::pointer::{PointerAssigner, PointerTable};
use crate::schema::Schema;
use crate::walker::Walker;
use shape_schema_common::{traits, Result, SchemaError, Shape, ShapeGraph, ShapeId, ShapeKind};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace, warn};

type ShapePredicate = Box<dyn Fn(&Shape) -> bool>;

/// Converts shapes into a flat JSON Schema document
///
/// Each included shape gets exactly one definition under a unique pointer,
/// and every nested type is a `$ref` to one of those definitions. A
/// converter can be reused; each call builds its own pointer table.
pub struct JsonSchemaConverter {
    config: JsonSchemaConfig,
    mappers: Vec<Box<dyn SchemaMapper>>,
    predicate: Option<ShapePredicate>,
}

impl JsonSchemaConverter {
    /// Create a converter, rejecting invalid settings up front
    pub fn new(config: JsonSchemaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            mappers: vec![Box::new(TraitMapper), Box::new(DisableKeywordsMapper)],
            predicate: None,
        })
    }

    /// Add a mapper; mappers run in ascending `order()`
    pub fn with_mapper<M: SchemaMapper + 'static>(mut self, mapper: M) -> Self {
        self.mappers.push(Box::new(mapper));
        self.mappers.sort_by_key(|mapper| mapper.order());
        self
    }

    /// Only convert shapes accepted by `predicate`
    pub fn with_shape_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Shape) -> bool + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    pub fn config(&self) -> &JsonSchemaConfig {
        &self.config
    }

    /// Convert every shape of the graph
    pub fn convert(&self, graph: &ShapeGraph) -> Result<SchemaDocument> {
        self.run(graph, None)
    }

    /// Convert one shape; its schema becomes the document root
    pub fn convert_shape(&self, graph: &ShapeGraph, root: &ShapeId) -> Result<SchemaDocument> {
        self.convert_shapes(graph, std::slice::from_ref(root))
    }

    /// Convert the closure of several roots
    pub fn convert_shapes(&self, graph: &ShapeGraph, roots: &[ShapeId]) -> Result<SchemaDocument> {
        if roots.is_empty() {
            return Err(SchemaError::UnsupportedConfiguration(
                "At least one root shape is required".to_string(),
            ));
        }
        self.run(graph, Some(roots))
    }

    /// Pointers that a conversion of `roots` (or the whole graph) would use
    pub fn pointers(&self, graph: &ShapeGraph, roots: Option<&[ShapeId]>) -> Result<PointerTable> {
        let (conversion, _) = self.prepare(graph, roots)?;
        Ok(conversion.table)
    }

    fn run(&self, graph: &ShapeGraph, roots: Option<&[ShapeId]>) -> Result<SchemaDocument> {
        let (conversion, emitted) = self.prepare(graph, roots)?;

        let mut document = SchemaDocument {
            schema_keyword: self.config.schema_keyword.clone(),
            extensions: self.config.schema_document_extensions.clone(),
            ..Default::default()
        };

        let mut owners: BTreeMap<&str, &ShapeId> = BTreeMap::new();
        for shape in &emitted {
            let pointer = conversion.table.pointer(&shape.id)?;
            if let Some(first) = owners.insert(pointer, &shape.id) {
                return Err(SchemaError::ConflictingName {
                    pointer: pointer.to_string(),
                    first: first.clone(),
                    second: shape.id.clone(),
                });
            }

            let schema = conversion.schema_for(shape)?;
            trace!(shape = %shape.id, pointer, "Built definition");
            document.definitions.insert(pointer.to_string(), schema);
        }

        // Repeated roots count once
        let distinct: Vec<&ShapeId> = roots
            .map(|roots| roots.iter().collect::<BTreeSet<_>>().into_iter().collect())
            .unwrap_or_default();
        if let [root] = distinct[..] {
            let shape = graph.get(root).ok_or_else(|| SchemaError::UnresolvedReference {
                referrer: "the conversion roots".to_string(),
                target: root.clone(),
            })?;
            if conversion.is_kept(shape) {
                document.root = Some(conversion.schema_for(shape)?);
                document.root_pointer = conversion.table.get(root).map(str::to_string);
            } else {
                debug!(root = %root, "Root shape is excluded; no root schema written");
            }
        }

        debug!(
            definitions = document.definitions.len(),
            root = document.root.is_some(),
            "Converted shape graph"
        );

        Ok(document)
    }

    /// Walk, filter, and assign pointers
    fn prepare<'a>(
        &'a self,
        graph: &'a ShapeGraph,
        roots: Option<&[ShapeId]>,
    ) -> Result<(Conversion<'a>, Vec<&'a Shape>)> {
        let walker = Walker::new(graph);
        let walked = match roots {
            Some(roots) => walker.walk(roots)?,
            None => walker.walk_all()?,
        };

        let kept: BTreeSet<&ShapeId> = walked
            .iter()
            .copied()
            .filter(|shape| !shape.is_member() && self.is_included(graph, shape))
            .map(|shape| &shape.id)
            .collect();

        let mut conversion = Conversion {
            converter: self,
            graph,
            kept,
            table: PointerTable::default(),
        };

        let emitted: Vec<&Shape> = walked
            .iter()
            .copied()
            .filter(|shape| {
                if shape.is_member() {
                    self.config.member_definitions && conversion.is_kept(shape)
                } else {
                    conversion.kept.contains(&shape.id)
                }
            })
            .collect();

        debug!(
            walked = walked.len(),
            emitted = emitted.len(),
            "Selected shapes for conversion"
        );

        conversion.table = PointerAssigner::new(&self.config).assign(&emitted)?;
        Ok((conversion, emitted))
    }

    /// Kind, privacy, and custom predicate checks
    fn is_included(&self, graph: &ShapeGraph, shape: &Shape) -> bool {
        if !shape.kind.is_schema_kind() {
            return false;
        }

        if !self.config.include_private_shapes {
            let private_container = graph
                .container_of(&shape.id)
                .map_or(false, |container| container.has_trait(traits::PRIVATE));
            if shape.has_trait(traits::PRIVATE) || private_container {
                return false;
            }
        }

        self.predicate
            .as_ref()
            .map_or(true, |predicate| predicate(shape))
    }
}

/// State of one conversion call
struct Conversion<'a> {
    converter: &'a JsonSchemaConverter,
    graph: &'a ShapeGraph,
    /// Included non-member shapes
    kept: BTreeSet<&'a ShapeId>,
    table: PointerTable,
}

impl<'a> Conversion<'a> {
    fn config(&self) -> &JsonSchemaConfig {
        &self.converter.config
    }

    /// A member is kept when it, its container, and its target all are
    fn is_kept(&self, shape: &Shape) -> bool {
        match shape.target() {
            Some(target) => {
                self.converter.is_included(self.graph, shape)
                    && self
                        .graph
                        .container_of(&shape.id)
                        .map_or(false, |c| self.converter.is_included(self.graph, c))
                    && self.kept.contains(target)
            }
            None => self.kept.contains(&shape.id),
        }
    }

    /// Body of a shape followed by every mapper
    fn schema_for(&self, shape: &Shape) -> Result<Schema> {
        let mut schema = self.body(shape)?;
        for mapper in &self.converter.mappers {
            mapper.update_schema(shape, &mut schema, self.config());
        }
        Ok(schema)
    }

    fn body(&self, shape: &Shape) -> Result<Schema> {
        let schema = match &shape.kind {
            ShapeKind::Blob | ShapeKind::String => Schema::typed("string"),
            ShapeKind::Boolean => Schema::typed("boolean"),
            kind @ (ShapeKind::Byte
            | ShapeKind::Short
            | ShapeKind::Integer
            | ShapeKind::Long
            | ShapeKind::Float
            | ShapeKind::Double
            | ShapeKind::BigInteger
            | ShapeKind::BigDecimal) => {
                if self.config().use_integer_type && kind.is_integral() {
                    Schema::typed("integer")
                } else {
                    Schema::typed("number")
                }
            }
            ShapeKind::Timestamp => {
                let mut schema = Schema::default();
                self.apply_timestamp_format(shape, &mut schema);
                schema
            }
            ShapeKind::Document => Schema::default(),
            ShapeKind::List { member } => {
                let mut schema = Schema::typed("array");
                schema.items = self.member_ref(shape, member)?.map(|(_, s)| Box::new(s));
                schema
            }
            ShapeKind::Set { member } => {
                let mut schema = Schema::typed("array");
                schema.items = self.member_ref(shape, member)?.map(|(_, s)| Box::new(s));
                schema.unique_items = true;
                schema
            }
            ShapeKind::Map { key, value } => {
                let mut schema = Schema::typed("object");
                schema.property_names = self.member_ref(shape, key)?.map(|(_, s)| Box::new(s));
                schema.additional_properties =
                    self.member_ref(shape, value)?.map(|(_, s)| Box::new(s));
                schema
            }
            ShapeKind::Structure { members } => self.structure(shape, members)?,
            ShapeKind::Union { members } => match self.config().union_strategy {
                UnionStrategy::OneOf => self.one_of(shape, members)?,
                UnionStrategy::Object => Schema::typed("object"),
                UnionStrategy::Structure => self.structure(shape, members)?,
            },
            ShapeKind::Member { target } => {
                let target_shape = self.graph.expect(&shape.id, target)?;
                if target_shape.is_member() {
                    return Err(SchemaError::Parse(format!(
                        "Member `{}` cannot target member `{}`",
                        shape.id, target
                    )));
                }
                let mut schema = self.schema_for(target_shape)?;
                if target_shape.kind == ShapeKind::Timestamp
                    && shape.has_trait(traits::TIMESTAMP_FORMAT)
                {
                    self.apply_timestamp_format(shape, &mut schema);
                }
                schema
            }
            ShapeKind::Operation { .. } | ShapeKind::Resource { .. } | ShapeKind::Service { .. } => {
                return Err(SchemaError::UnsupportedConfiguration(format!(
                    "Shape `{}` of type {} has no JSON Schema representation",
                    shape.id,
                    shape.kind.type_name()
                )))
            }
        };

        Ok(schema)
    }

    fn structure(&self, shape: &Shape, members: &[ShapeId]) -> Result<Schema> {
        let mut schema = Schema::typed("object");
        for member_id in members {
            let Some((member, reference)) = self.member_ref(shape, member_id)? else {
                continue;
            };
            let name = self.property_name(member);
            if member.has_trait(traits::REQUIRED) {
                schema.require(&name);
            }
            schema.properties.insert(name, reference);
        }
        Ok(schema)
    }

    /// One required single-property object per member
    fn one_of(&self, shape: &Shape, members: &[ShapeId]) -> Result<Schema> {
        let mut schema = Schema::default();
        for member_id in members {
            let Some((member, reference)) = self.member_ref(shape, member_id)? else {
                continue;
            };
            let name = self.property_name(member);
            let mut option = Schema::typed("object");
            option.require(&name);
            option.properties.insert(name, reference);
            schema.one_of.push(option);
        }
        Ok(schema)
    }

    /// Reference to a member, or `None` when the member is excluded
    fn member_ref(
        &self,
        container: &Shape,
        member_id: &ShapeId,
    ) -> Result<Option<(&'a Shape, Schema)>> {
        let member = self.graph.expect(&container.id, member_id)?;
        let target = member.target().ok_or_else(|| {
            SchemaError::Parse(format!(
                "`{}` lists `{}` as a member, but it is a {}",
                container.id,
                member_id,
                member.kind.type_name()
            ))
        })?;

        if !self.is_kept(member) {
            warn!(
                member = %member_id,
                target = %target,
                "Omitting reference to an excluded shape"
            );
            return Ok(None);
        }

        let pointer_id = if self.config().member_definitions {
            member_id
        } else {
            target
        };
        let reference = Schema::reference(self.table.pointer(pointer_id)?);
        Ok(Some((member, reference)))
    }

    fn property_name(&self, member: &Shape) -> String {
        if self.config().use_json_name {
            if let Some(name) = member.string_trait(traits::JSON_NAME) {
                return name.to_string();
            }
        }
        member.id.member().unwrap_or(member.id.name()).to_string()
    }

    fn apply_timestamp_format(&self, shape: &Shape, schema: &mut Schema) {
        let format = match shape.string_trait(traits::TIMESTAMP_FORMAT) {
            Some(value) => value.parse().unwrap_or_else(|_| {
                warn!(
                    shape = %shape.id,
                    format = value,
                    "Unknown timestampFormat; using the default"
                );
                self.config().default_timestamp_format
            }),
            None => self.config().default_timestamp_format,
        };

        match format {
            TimestampFormat::DateTime => {
                schema.type_ = Some("string".to_string());
                schema.format = Some("date-time".to_string());
            }
            TimestampFormat::EpochSeconds => {
                schema.type_ = Some("number".to_string());
                schema.format = None;
            }
            TimestampFormat::HttpDate => {
                schema.type_ = Some("string".to_string());
                schema.format = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::MockSchemaMapper;
    use mockall::Sequence;

    fn graph() -> ShapeGraph {
        ShapeGraph::builder()
            .string("com.example#Name")
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_rejects_bad_pointer() {
        let config = JsonSchemaConfig {
            definition_pointer: "definitions".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            JsonSchemaConverter::new(config),
            Err(SchemaError::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_mappers_run_in_order() {
        let mut seq = Sequence::new();

        let mut early = MockSchemaMapper::new();
        early.expect_order().return_const(-1i8);
        early
            .expect_update_schema()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, schema, _| schema.title = Some("early".to_string()));

        let mut late = MockSchemaMapper::new();
        late.expect_order().return_const(10i8);
        late.expect_update_schema()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, schema, _| {
                assert_eq!(schema.title.as_deref(), Some("early"));
                schema.title = Some("late".to_string());
            });

        // Added out of order on purpose
        let converter = JsonSchemaConverter::new(JsonSchemaConfig::default())
            .unwrap()
            .with_mapper(late)
            .with_mapper(early);

        let doc = converter.convert(&graph()).unwrap();
        assert_eq!(
            doc.definitions["#/definitions/Name"].title.as_deref(),
            Some("late")
        );
    }

    #[test]
    fn test_disable_keywords_runs_after_custom_mappers() {
        let mut mapper = MockSchemaMapper::new();
        mapper.expect_order().return_const(100i8);
        mapper
            .expect_update_schema()
            .returning(|_, schema, _| schema.description = Some("added".to_string()));

        let config = JsonSchemaConfig {
            disable_keywords: vec!["description".to_string()],
            ..Default::default()
        };
        let converter = JsonSchemaConverter::new(config)
            .unwrap()
            .with_mapper(mapper);

        let doc = converter.convert(&graph()).unwrap();
        assert_eq!(doc.definitions["#/definitions/Name"].description, None);
    }

    #[test]
    fn test_operations_are_not_emitted() {
        let graph = ShapeGraph::builder()
            .structure("com.example#Input", &[])
            .operation("com.example#Run", Some("com.example#Input"), None)
            .service("com.example#Svc", &["com.example#Run"])
            .build()
            .unwrap();

        let converter = JsonSchemaConverter::new(JsonSchemaConfig::default()).unwrap();
        let doc = converter
            .convert_shape(&graph, &"com.example#Svc".parse().unwrap())
            .unwrap();

        assert!(doc.root.is_none());
        let pointers: Vec<&str> = doc.pointers().collect();
        assert_eq!(pointers, vec!["#/definitions/Input"]);
    }

    #[test]
    fn test_empty_roots_rejected() {
        let converter = JsonSchemaConverter::new(JsonSchemaConfig::default()).unwrap();
        assert!(matches!(
            converter.convert_shapes(&graph(), &[]),
            Err(SchemaError::UnsupportedConfiguration(_))
        ));
    }
}
