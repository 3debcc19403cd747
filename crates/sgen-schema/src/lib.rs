//! sgen-schema - Schema graph, document loading, and normalization
//!
//! - [`SchemaGraph`] is an arena of [`SchemaNode`]s addressed by [`SchemaId`]
//! - [`DocumentSet`] holds the root document and every document it references
//! - [`normalize`] rewrites discriminator hierarchies into explicit
//!   base/derived links before type resolution

mod graph;
mod load;
mod normalize;

pub use graph::{
    AdditionalProperties, Discriminator, Edge, JsonType, SchemaGraph, SchemaId, SchemaNode,
    TYPE_NAME_EXTENSION,
};
pub use load::{DocumentFormat, DocumentSet, default_base_url, parse_document};
pub use normalize::{ANONYMOUS_ANCHOR, NormalizeReport, normalize};
