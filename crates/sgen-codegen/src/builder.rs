//! Type model construction
//!
//! [`ModelBuilder`] turns each nominal schema registered with the resolver
//! into a [`TypeModel`]. Building a class resolves its members, base and
//! derived types, which may register further nominal schemas; the builder
//! keeps going until no registered schema is left without a model.

use crate::model::{
    ClassModel, DefaultAssignment, DefaultValue, DiscriminatorModel, EnumMember, EnumModel,
    Member, TypeModel,
};
use crate::naming::{MemberScope, to_field_name};
use crate::resolver::{NominalKind, Primitive, TypeRef, TypeResolver};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use sgen_schema::{JsonType, SchemaGraph, SchemaId};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

pub struct ModelBuilder<'g> {
    resolver: TypeResolver<'g>,
    models: IndexMap<SchemaId, TypeModel>,
    member_names: HashMap<SchemaId, IndexMap<String, String>>,
}

impl<'g> ModelBuilder<'g> {
    pub fn new(graph: &'g SchemaGraph) -> Self {
        Self {
            resolver: TypeResolver::new(graph),
            models: IndexMap::new(),
            member_names: HashMap::new(),
        }
    }

    pub fn resolver(&mut self) -> &mut TypeResolver<'g> {
        &mut self.resolver
    }

    /// Build the model of a registered nominal schema
    ///
    /// Returns `None` when `schema` is not registered as a nominal type.
    pub fn build(&mut self, schema: SchemaId) -> Option<&TypeModel> {
        let schema = self.resolver.graph().actual(schema);
        if !self.models.contains_key(&schema) {
            let nominal = self.resolver.nominals().get(&schema)?.clone();
            let model = match nominal.kind {
                NominalKind::Class => TypeModel::Class(self.build_class(schema, &nominal.name)),
                NominalKind::Enum => TypeModel::Enum(self.build_enum(schema, &nominal.name)),
            };
            self.models.insert(schema, model);
        }
        self.models.get(&schema)
    }

    /// Build every registered nominal type, including the ones registered
    /// while building, in registration order
    pub fn build_all(mut self) -> Vec<TypeModel> {
        let mut next = 0;
        while let Some(schema) = self.resolver.nominals().get_index(next).map(|(id, _)| *id) {
            next += 1;
            self.build(schema);
        }
        debug!(models = self.models.len(), "built type models");
        let order: Vec<SchemaId> = self.resolver.nominals().keys().copied().collect();
        order
            .into_iter()
            .filter_map(|schema| self.models.shift_remove(&schema))
            .collect()
    }

    fn build_class(&mut self, schema: SchemaId, name: &str) -> ClassModel {
        let graph = self.resolver.graph();
        let node = graph.node(schema);
        trace!(%schema, name, "building class model");

        let base = graph
            .inherited(schema)
            .and_then(|base| self.resolver.resolve_class(base, None))
            .map(|nominal| nominal.name);

        let names = self.member_names(schema, name);
        let properties = graph.actual_properties(schema);
        let mut members = Vec::new();
        for (wire_name, identifier) in &names {
            let Some(property) = properties.get(wire_name).copied() else {
                continue;
            };
            members.push(self.build_member(schema, name, wire_name, identifier, property));
        }

        let derived_schemas = graph.derived_of(schema);
        let mut derived = Vec::new();
        let mut derived_names = Vec::new();
        for child in &derived_schemas {
            if let Some(nominal) = self.resolver.resolve_class(*child, None) {
                derived_names.push((*child, nominal.name.clone()));
                derived.push(nominal.name);
            }
        }

        let discriminator = node.discriminator.as_ref().map(|discriminator| {
            let mut mapping: Vec<(String, String)> = Vec::new();
            for (child, type_name) in &derived_names {
                let value = discriminator
                    .value_for(*child)
                    .map(str::to_string)
                    .unwrap_or_else(|| type_name.clone());
                if mapping.iter().any(|(existing, _)| *existing == value) {
                    warn!(class = name, %value, "duplicate discriminator value ignored");
                    continue;
                }
                mapping.push((value, type_name.clone()));
            }
            for (value, target) in &discriminator.mapping {
                if !derived_names.iter().any(|(child, _)| child == target) {
                    warn!(
                        class = name,
                        %value,
                        "discriminator mapping target does not derive from its base"
                    );
                }
            }
            DiscriminatorModel {
                property_name: discriminator.property_name.clone(),
                mapping,
            }
        });

        let is_abstract = node.is_abstract
            || (discriminator.is_some()
                && members.is_empty()
                && node.types.is_empty()
                && !derived.is_empty());

        ClassModel {
            name: name.to_string(),
            schema,
            description: node.description.clone(),
            base,
            members,
            is_abstract,
            discriminator,
            derived,
        }
    }

    fn build_member(
        &mut self,
        owner: SchemaId,
        class_name: &str,
        wire_name: &str,
        identifier: &str,
        property: SchemaId,
    ) -> Member {
        let graph = self.resolver.graph();
        let hint = self.member_type_hint(class_name, identifier, property);
        let ty = self.resolver.resolve(property, Some(&hint));
        let default = default_of(graph, property).and_then(|value| self.default_value(&value, &ty));
        let description = graph
            .node(property)
            .description
            .clone()
            .or_else(|| graph.node(graph.actual(property)).description.clone());
        Member {
            name: identifier.to_string(),
            field_name: to_field_name(identifier),
            wire_name: wire_name.to_string(),
            nullable: ty.is_nullable(),
            required: graph.is_required(owner, wire_name),
            ty,
            default,
            description,
        }
    }

    /// Name hint for the type of an inline member schema
    ///
    /// Inline enumerations are prefixed with the enclosing class name.
    fn member_type_hint(&self, class_name: &str, identifier: &str, property: SchemaId) -> String {
        let graph = self.resolver.graph();
        let actual = graph.actual(property);
        let inline_enum = graph.node(actual).is_enumeration() && graph.definition_name(actual).is_none();
        if inline_enum && !identifier.starts_with(class_name) {
            format!("{class_name}{identifier}")
        } else {
            identifier.to_string()
        }
    }

    /// Member identifiers of `schema`, keyed by wire name
    ///
    /// Discriminator properties of the class and its ancestors are left out.
    fn member_names(&mut self, schema: SchemaId, class_name: &str) -> IndexMap<String, String> {
        if let Some(names) = self.member_names.get(&schema) {
            return names.clone();
        }
        let graph = self.resolver.graph();
        let excluded: HashSet<String> = std::iter::once(schema)
            .chain(graph.ancestors(schema))
            .filter_map(|id| graph.node(id).discriminator.as_ref())
            .map(|discriminator| discriminator.property_name.clone())
            .collect();
        let mut scope = MemberScope::new(class_name);
        let names: IndexMap<String, String> = graph
            .actual_properties(schema)
            .keys()
            .filter(|wire_name| !excluded.contains(*wire_name))
            .map(|wire_name| (wire_name.clone(), scope.name_member(wire_name)))
            .collect();
        self.member_names.insert(schema, names.clone());
        names
    }

    fn default_value(&mut self, value: &Value, ty: &TypeRef) -> Option<DefaultValue> {
        match (value, ty.non_null()) {
            (Value::Null, _) => None,
            (Value::Object(fields), TypeRef::Nominal(nominal))
                if nominal.kind == NominalKind::Class =>
            {
                let Some(schema) = nominal.schema else {
                    warn!(type_name = %nominal.name, "object default for external type ignored");
                    return None;
                };
                let assignments = self.default_assignments(schema, &nominal.name, fields);
                Some(DefaultValue::Object {
                    type_name: nominal.name.clone(),
                    assignments,
                })
            }
            (Value::Object(_) | Value::Array(_), _) => {
                debug!(ty = ?ty, "structured default ignored for non-class member");
                None
            }
            (literal, TypeRef::Nominal(nominal)) if nominal.kind == NominalKind::Enum => {
                let member = nominal
                    .schema
                    .and_then(|schema| self.enum_member_for(schema, &nominal.name, literal));
                match member {
                    Some(member) => Some(DefaultValue::EnumMember {
                        type_name: nominal.name.clone(),
                        member,
                    }),
                    None => {
                        warn!(type_name = %nominal.name, value = %literal, "default is not an enumeration value");
                        None
                    }
                }
            }
            (literal, target) if literal_fits(literal, target) => {
                Some(DefaultValue::Literal(literal.clone()))
            }
            (literal, _) => {
                warn!(value = %literal, ty = ?ty, "default does not match member type");
                None
            }
        }
    }

    /// Assignments for each key of an object default that names a member of
    /// `schema` or one of its ancestors
    fn default_assignments(
        &mut self,
        schema: SchemaId,
        type_name: &str,
        fields: &Map<String, Value>,
    ) -> Vec<DefaultAssignment> {
        let graph = self.resolver.graph();
        let owners: Vec<SchemaId> = std::iter::once(schema)
            .chain(graph.ancestors(schema))
            .collect();
        let mut assignments = Vec::new();
        for (key, value) in fields {
            let found = owners.iter().find_map(|owner| {
                graph
                    .actual_properties(*owner)
                    .get(key)
                    .map(|property| (*owner, *property))
            });
            let Some((owner, property)) = found else {
                warn!(type_name, %key, "default key matches no property");
                continue;
            };
            let owner_name = if owner == schema {
                type_name.to_string()
            } else {
                match self.resolver.resolve_class(owner, None) {
                    Some(nominal) => nominal.name,
                    None => continue,
                }
            };
            let Some(member) = self.member_names(owner, &owner_name).get(key).cloned() else {
                continue;
            };
            let hint = self.member_type_hint(&owner_name, &member, property);
            let ty = self.resolver.resolve(property, Some(&hint));
            if let Some(value) = self.default_value(value, &ty) {
                assignments.push(DefaultAssignment { member, ty, value });
            }
        }
        assignments
    }

    fn enum_member_for(&self, schema: SchemaId, type_name: &str, literal: &Value) -> Option<String> {
        let graph = self.resolver.graph();
        let position = graph
            .node(schema)
            .enumeration
            .iter()
            .filter(|value| !value.is_null())
            .position(|value| value == literal)?;
        self.enum_members(schema, type_name)
            .into_iter()
            .nth(position)
            .map(|member| member.name)
    }

    fn build_enum(&mut self, schema: SchemaId, name: &str) -> EnumModel {
        let node = self.resolver.graph().node(schema);
        trace!(%schema, name, "building enum model");
        EnumModel {
            name: name.to_string(),
            schema,
            description: node.description.clone(),
            members: self.enum_members(schema, name),
            is_integer: is_integer_enum(self.resolver.graph(), schema),
        }
    }

    fn enum_members(&self, schema: SchemaId, name: &str) -> Vec<EnumMember> {
        let graph = self.resolver.graph();
        let node = graph.node(schema);
        let is_integer = is_integer_enum(graph, schema);
        let mut scope = MemberScope::new(name);
        node.enumeration
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.is_null())
            .enumerate()
            .map(|(position, (index, value))| {
                let hint = node.enum_names.get(index).map(String::as_str);
                let value_number = if is_integer {
                    value.as_i64().unwrap_or(position as i64)
                } else {
                    position as i64
                };
                EnumMember {
                    name: scope.name_enum_value(index, hint, value),
                    value: value_number,
                    wire_value: match value {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    },
                }
            })
            .collect()
    }
}

fn is_integer_enum(graph: &SchemaGraph, schema: SchemaId) -> bool {
    let node = graph.node(schema);
    if node.has_type(JsonType::Integer) {
        return true;
    }
    !node.has_type(JsonType::String)
        && node
            .enumeration
            .iter()
            .filter(|value| !value.is_null())
            .all(Value::is_i64)
}

/// Declared default along the reference chain, nearest first
fn default_of(graph: &SchemaGraph, property: SchemaId) -> Option<Value> {
    graph
        .node(property)
        .default
        .as_ref()
        .or_else(|| graph.node(graph.actual(property)).default.as_ref())
        .cloned()
}

/// Whether a scalar literal can initialize a member of type `ty`
fn literal_fits(literal: &Value, ty: &TypeRef) -> bool {
    let TypeRef::Primitive(primitive) = ty else {
        return false;
    };
    match literal {
        Value::Bool(_) => matches!(primitive, Primitive::Boolean | Primitive::Object),
        Value::Number(number) if primitive.is_integral() => number.is_i64() || number.is_u64(),
        Value::Number(_) => primitive.is_numeric() || *primitive == Primitive::Object,
        Value::String(_) => matches!(
            primitive,
            Primitive::String
                | Primitive::Object
                | Primitive::DateTimeOffset
                | Primitive::TimeSpan
                | Primitive::Guid
        ),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}
