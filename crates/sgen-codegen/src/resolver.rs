//! Schema to C# type resolution
//!
//! [`TypeResolver`] maps a schema identity to a [`TypeRef`]. Results are
//! memoized per identity, so the same schema always resolves to the same
//! type and each nominal schema is named exactly once.
//!
//! ```text
//!  schema ──remove nullability──► target ──shape──► enum | array | map | class | primitive
//!            │                                          │
//!            └─ union of N branches ─► common base ─────┘
//!                                      (none: object)
//! ```

use crate::naming::TypeNamer;
use indexmap::IndexMap;
use sgen_schema::{AdditionalProperties, JsonType, SchemaGraph, SchemaId};
use std::collections::{HashMap, HashSet};
use tracing::trace;

/// Built-in value and reference types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Boolean,
    Byte,
    Short,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
    String,
    DateTimeOffset,
    TimeSpan,
    Guid,
    /// The "any" type
    Object,
}

impl Primitive {
    /// Primitive for a single JSON type and an optional `format`
    pub fn from_json_type(ty: JsonType, format: Option<&str>) -> Self {
        match (ty, format) {
            (JsonType::Boolean, _) => Primitive::Boolean,
            (JsonType::Integer, Some("int64" | "long")) => Primitive::Long,
            (JsonType::Integer, Some("int16")) => Primitive::Short,
            (JsonType::Integer, Some("uint8" | "byte")) => Primitive::Byte,
            (JsonType::Integer, Some("uint32")) => Primitive::UInt,
            (JsonType::Integer, Some("uint64")) => Primitive::ULong,
            (JsonType::Integer, _) => Primitive::Int,
            (JsonType::Number, Some("float")) => Primitive::Float,
            (JsonType::Number, Some("decimal")) => Primitive::Decimal,
            (JsonType::Number, _) => Primitive::Double,
            (JsonType::String, Some("date-time")) => Primitive::DateTimeOffset,
            (JsonType::String, Some("duration" | "time-span")) => Primitive::TimeSpan,
            (JsonType::String, Some("uuid" | "guid")) => Primitive::Guid,
            (JsonType::String, _) => Primitive::String,
            (JsonType::Null | JsonType::Array | JsonType::Object, _) => Primitive::Object,
        }
    }

    pub fn is_value_type(&self) -> bool {
        !matches!(self, Primitive::String | Primitive::Object)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Primitive::Byte
                | Primitive::Short
                | Primitive::Int
                | Primitive::UInt
                | Primitive::Long
                | Primitive::ULong
                | Primitive::Float
                | Primitive::Double
                | Primitive::Decimal
        )
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Primitive::Byte
                | Primitive::Short
                | Primitive::Int
                | Primitive::UInt
                | Primitive::Long
                | Primitive::ULong
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NominalKind {
    Class,
    Enum,
}

/// A named type: generated from a schema, or supplied externally
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Nominal {
    pub name: String,
    pub kind: NominalKind,
    /// Schema the type is generated from; `None` for external types
    pub schema: Option<SchemaId>,
}

impl Nominal {
    pub fn is_external(&self) -> bool {
        self.schema.is_none()
    }
}

/// Canonical type of a schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Primitive(Primitive),
    Nominal(Nominal),
    Array(Box<TypeRef>),
    /// String-keyed map
    Dictionary(Box<TypeRef>, Box<TypeRef>),
    Nullable(Box<TypeRef>),
}

impl TypeRef {
    /// The "any" type
    pub const ANY: TypeRef = TypeRef::Primitive(Primitive::Object);

    /// The type with one level of nullability removed
    pub fn non_null(&self) -> &TypeRef {
        match self {
            TypeRef::Nullable(inner) => inner,
            other => other,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, TypeRef::Nullable(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.non_null(), TypeRef::Array(_))
    }

    pub fn is_any(&self) -> bool {
        *self.non_null() == TypeRef::ANY
    }

    pub fn nominal(&self) -> Option<&Nominal> {
        match self.non_null() {
            TypeRef::Nominal(nominal) => Some(nominal),
            _ => None,
        }
    }

    /// Whether the rendered type is a .NET value type
    pub fn is_value_type(&self) -> bool {
        match self {
            TypeRef::Primitive(primitive) => primitive.is_value_type(),
            TypeRef::Nominal(nominal) => nominal.kind == NominalKind::Enum,
            _ => false,
        }
    }
}

/// Memoized schema-to-type resolver
pub struct TypeResolver<'g> {
    graph: &'g SchemaGraph,
    namer: TypeNamer,
    resolved: HashMap<SchemaId, TypeRef>,
    common_bases: HashMap<SchemaId, Option<SchemaId>>,
    inheritance_targets: HashSet<SchemaId>,
    in_progress: HashSet<SchemaId>,
    nominals: IndexMap<SchemaId, Nominal>,
}

impl<'g> TypeResolver<'g> {
    pub fn new(graph: &'g SchemaGraph) -> Self {
        let inheritance_targets = graph.ids().filter_map(|id| graph.inherited(id)).collect();
        Self {
            graph,
            namer: TypeNamer::new(),
            resolved: HashMap::new(),
            common_bases: HashMap::new(),
            inheritance_targets,
            in_progress: HashSet::new(),
            nominals: IndexMap::new(),
        }
    }

    pub fn graph(&self) -> &'g SchemaGraph {
        self.graph
    }

    /// Generated nominal types in registration order
    pub fn nominals(&self) -> &IndexMap<SchemaId, Nominal> {
        &self.nominals
    }

    pub fn nominal(&self, schema: SchemaId) -> Option<&Nominal> {
        self.nominals.get(&self.graph.actual(schema))
    }

    /// Resolve the type of `schema`
    ///
    /// `hint` names a newly registered nominal type when the schema is not
    /// a definition of its own.
    pub fn resolve(&mut self, schema: SchemaId, hint: Option<&str>) -> TypeRef {
        if let Some(ty) = self.resolved.get(&schema) {
            return ty.clone();
        }
        if !self.in_progress.insert(schema) {
            return TypeRef::ANY;
        }
        let ty = match self.remove_nullability(schema) {
            Some(target) => self.resolve_target(target, hint),
            None => TypeRef::ANY,
        };
        let ty = if self.graph.is_nullable(schema) && ty != TypeRef::ANY {
            TypeRef::Nullable(Box::new(ty))
        } else {
            ty
        };
        trace!(%schema, ty = ?ty, "resolved type");
        self.in_progress.remove(&schema);
        self.resolved.insert(schema, ty.clone());
        ty
    }

    /// Resolve `schema` as a class, registering it even when its shape alone
    /// would not make it one
    pub fn resolve_class(&mut self, schema: SchemaId, hint: Option<&str>) -> Option<Nominal> {
        let graph = self.graph;
        let actual = graph.actual(schema);
        if let Some(name) = graph.node(actual).external_type_name() {
            return Some(Nominal {
                name: name.to_string(),
                kind: NominalKind::Class,
                schema: None,
            });
        }
        if graph.node(actual).is_enumeration() {
            return None;
        }
        Some(self.register(actual, hint, NominalKind::Class))
    }

    /// The single schema standing for `schema` once `null` is ruled out
    ///
    /// A bare union with one non-null branch resolves to that branch. With
    /// several branches the nearest common base is used; `None` means the
    /// branches share no ancestor and the union is "any".
    pub fn remove_nullability(&mut self, schema: SchemaId) -> Option<SchemaId> {
        let actual = self.graph.actual(schema);
        if !self.is_bare_union(actual) {
            return Some(actual);
        }
        let members: Vec<SchemaId> = self
            .graph
            .union_members(actual)
            .iter()
            .copied()
            .filter(|member| !self.graph.is_null_schema(*member))
            .collect();
        match members.as_slice() {
            [] => Some(actual),
            [single] => Some(self.graph.actual(*single)),
            _ => self.common_base(actual, &members),
        }
    }

    fn is_bare_union(&self, id: SchemaId) -> bool {
        let node = self.graph.node(id);
        !self.graph.union_members(id).is_empty()
            && node.properties.is_empty()
            && node.items.is_none()
            && node.enumeration.is_empty()
            && node.non_null_types().all(|ty| ty == JsonType::Object)
    }

    /// Most specific schema every member is assignable to
    pub fn common_base(&mut self, owner: SchemaId, members: &[SchemaId]) -> Option<SchemaId> {
        if let Some(base) = self.common_bases.get(&owner) {
            return *base;
        }
        let mut actuals = members.iter().map(|member| self.graph.actual(*member));
        let mut candidate = actuals.next();
        for member in actuals {
            candidate = candidate.and_then(|current| self.find_best_base(current, member));
        }
        trace!(%owner, base = ?candidate, "common base");
        self.common_bases.insert(owner, candidate);
        candidate
    }

    fn find_best_base(&self, candidate: SchemaId, other: SchemaId) -> Option<SchemaId> {
        std::iter::once(candidate)
            .chain(self.graph.ancestors(candidate))
            .find(|base| self.is_assignable_from(*base, other))
    }

    /// Whether a value of `derived` can stand where `base` is expected
    pub fn is_assignable_from(&self, base: SchemaId, derived: SchemaId) -> bool {
        let base = self.graph.actual(base);
        let derived = self.graph.actual(derived);
        base == derived || self.graph.ancestors(derived).contains(&base)
    }

    fn resolve_target(&mut self, target: SchemaId, hint: Option<&str>) -> TypeRef {
        let graph = self.graph;
        let node = graph.node(target);
        if let Some(name) = node.external_type_name() {
            let kind = if node.is_enumeration() {
                NominalKind::Enum
            } else {
                NominalKind::Class
            };
            return TypeRef::Nominal(Nominal {
                name: name.to_string(),
                kind,
                schema: None,
            });
        }
        if node.is_enumeration() {
            return TypeRef::Nominal(self.register(target, hint, NominalKind::Enum));
        }
        if node.has_type(JsonType::Array) || (node.types.is_empty() && node.items.is_some()) {
            let element = match node.items {
                Some(items) => self.resolve(items, hint),
                None => TypeRef::ANY,
            };
            return TypeRef::Array(Box::new(element));
        }
        if let Some(values) = self.dictionary_values(target) {
            let value = self.resolve(values, hint);
            return TypeRef::Dictionary(
                Box::new(TypeRef::Primitive(Primitive::String)),
                Box::new(value),
            );
        }
        if self.is_class(target) {
            return TypeRef::Nominal(self.register(target, hint, NominalKind::Class));
        }
        let mut types = node.non_null_types();
        match (types.next(), types.next()) {
            (Some(ty), None) => {
                TypeRef::Primitive(Primitive::from_json_type(ty, node.format.as_deref()))
            }
            _ => TypeRef::ANY,
        }
    }

    fn dictionary_values(&self, id: SchemaId) -> Option<SchemaId> {
        let node = self.graph.node(id);
        match node.additional_properties {
            AdditionalProperties::Schema(values)
                if self.graph.actual_properties(id).is_empty()
                    && node.discriminator.is_none()
                    && self.graph.inherited(id).is_none() =>
            {
                Some(values)
            }
            _ => None,
        }
    }

    fn is_class(&self, id: SchemaId) -> bool {
        let node = self.graph.node(id);
        if node.discriminator.is_some()
            || node.is_abstract
            || self.graph.inherited(id).is_some()
            || self.inheritance_targets.contains(&id)
            || !self.graph.actual_properties(id).is_empty()
        {
            return true;
        }
        let named = id == self.graph.root() || self.graph.definition_name(id).is_some();
        named && node.has_type(JsonType::Object)
    }

    fn register(&mut self, schema: SchemaId, hint: Option<&str>, kind: NominalKind) -> Nominal {
        if let Some(nominal) = self.nominals.get(&schema) {
            return nominal.clone();
        }
        let graph = self.graph;
        let hints = [
            graph.definition_name(schema),
            hint,
            graph.node(schema).title.as_deref(),
        ];
        let name = self.namer.name_type(schema, hints.into_iter().flatten());
        let nominal = Nominal {
            name,
            kind,
            schema: Some(schema),
        };
        trace!(%schema, name = %nominal.name, kind = ?kind, "registered nominal type");
        self.nominals.insert(schema, nominal.clone());
        nominal
    }
}

#[cfg(test)]
#[path = "resolver/resolver_tests.rs"]
mod resolver_tests;
