//! sgen-codegen - JSON Schema to C# code generation
//!
//! The pipeline has four stages, each in its own module:
//!
//! - [`naming`] turns schema keys and literals into C# identifiers
//! - [`resolver`] maps schema identities to canonical types
//! - [`builder`] builds a [`TypeModel`] for every nominal type
//! - [`csharp`] renders models into [`CodeArtifact`]s
//!
//! [`Generator`] drives them in order over a loaded
//! [`SchemaGraph`](sgen_schema::SchemaGraph).
//!
//! # Example
//!
//! ```
//! use sgen_codegen::{Generator, root_type_name};
//! use sgen_core::GeneratorSettings;
//! use sgen_schema::SchemaGraph;
//!
//! let graph = SchemaGraph::from_text(r#"{
//!     "title": "Container",
//!     "type": "object",
//!     "properties": { "base_type": { "type": "string" } }
//! }"#).unwrap();
//!
//! let root = root_type_name(&graph, None).unwrap();
//! let generated = Generator::new(GeneratorSettings::default())
//!     .generate(graph, &root)
//!     .unwrap();
//! assert!(generated.code.contains("public string BaseType"));
//! ```

pub mod artifact;
pub mod builder;
pub mod csharp;
pub mod generator;
pub mod model;
pub mod naming;
pub mod resolver;

pub use artifact::{ArtifactKind, CodeArtifact};
pub use builder::ModelBuilder;
pub use generator::{GeneratedCode, Generator, root_type_name};
pub use model::{ClassModel, EnumModel, Member, TypeModel};
pub use naming::{MemberScope, TypeNamer};
pub use resolver::{Nominal, NominalKind, Primitive, TypeRef, TypeResolver};
