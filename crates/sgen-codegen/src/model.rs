//! Type models: the language-level shape of every generated type
//!
//! Models are computed once by the [`builder`](crate::builder) and read by
//! the emitters. They carry resolved names and types only, never schema
//! nodes.

use crate::resolver::TypeRef;
use serde_json::Value;
use sgen_schema::SchemaId;

/// A generated class or enumeration
#[derive(Debug, Clone, PartialEq)]
pub enum TypeModel {
    Class(ClassModel),
    Enum(EnumModel),
}

impl TypeModel {
    pub fn name(&self) -> &str {
        match self {
            TypeModel::Class(class) => &class.name,
            TypeModel::Enum(enumeration) => &enumeration.name,
        }
    }

    pub fn schema(&self) -> SchemaId {
        match self {
            TypeModel::Class(class) => class.schema,
            TypeModel::Enum(enumeration) => enumeration.schema,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            TypeModel::Class(class) => class.description.as_deref(),
            TypeModel::Enum(enumeration) => enumeration.description.as_deref(),
        }
    }

    pub fn as_class(&self) -> Option<&ClassModel> {
        match self {
            TypeModel::Class(class) => Some(class),
            TypeModel::Enum(_) => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumModel> {
        match self {
            TypeModel::Enum(enumeration) => Some(enumeration),
            TypeModel::Class(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassModel {
    pub name: String,
    pub schema: SchemaId,
    pub description: Option<String>,
    /// Name of the base class
    pub base: Option<String>,
    pub members: Vec<Member>,
    pub is_abstract: bool,
    /// Discriminator declared by this class
    pub discriminator: Option<DiscriminatorModel>,
    /// Names of the classes deriving directly from this one
    pub derived: Vec<String>,
}

impl ClassModel {
    /// Whether this class starts an inheritance hierarchy
    pub fn is_root(&self) -> bool {
        self.base.is_none()
    }
}

/// Discriminator property plus the value selecting each derived class
#[derive(Debug, Clone, PartialEq)]
pub struct DiscriminatorModel {
    pub property_name: String,
    /// (discriminator value, derived class name), values unique
    pub mapping: Vec<(String, String)>,
}

/// One field/property pair of a class
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Property identifier
    pub name: String,
    /// Backing field identifier
    pub field_name: String,
    /// Key used on the wire
    pub wire_name: String,
    pub ty: TypeRef,
    pub required: bool,
    pub nullable: bool,
    pub default: Option<DefaultValue>,
    pub description: Option<String>,
}

/// Initial value of a member
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Scalar literal rendered against the member type
    Literal(Value),
    EnumMember { type_name: String, member: String },
    /// A fresh instance followed by assignments to its members
    Object {
        type_name: String,
        assignments: Vec<DefaultAssignment>,
    },
}

/// Assignment of a default to a member of a nested instance
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultAssignment {
    pub member: String,
    pub ty: TypeRef,
    pub value: DefaultValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumModel {
    pub name: String,
    pub schema: SchemaId,
    pub description: Option<String>,
    pub members: Vec<EnumMember>,
    /// Integer literals keep their values; string literals are indexed
    pub is_integer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
    /// Literal as written in the schema
    pub wire_value: String,
}
