//! Generation pipeline
//!
//! ```text
//!  SchemaGraph
//!     ↓
//!  [normalize]        discriminator hierarchies made explicit
//!     ↓
//!  [ModelBuilder]     root, definitions, then everything they reach
//!     ↓
//!  [emitters]         one artifact per model, then support and helpers
//!     ↓
//!  [assemble]         header, namespace block, bases before derived
//! ```
//!
//! Each phase runs to completion over the whole graph before the next one
//! starts. Namer, resolver and normalizer state live inside one
//! [`Generator::generate`] call.

use crate::artifact::{CodeArtifact, order_by_inheritance};
use crate::builder::ModelBuilder;
use crate::csharp::{
    self, emit_class, emit_enum, emit_serializers, emit_support_types, emit_workflow_operators,
};
use crate::model::TypeModel;
use crate::resolver::TypeRef;
use sgen_core::{GeneratorSettings, SgenError, SgenResult};
use sgen_schema::{SchemaGraph, normalize};
use tracing::debug;

/// Output of one generation run
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    pub models: Vec<TypeModel>,
    /// Ordered artifacts, the body of [`code`](Self::code)
    pub artifacts: Vec<CodeArtifact>,
    /// Complete compilation unit
    pub code: String,
}

/// Schema to C# generator
pub struct Generator {
    settings: GeneratorSettings,
}

impl Generator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Generate the compilation unit for `graph`
    ///
    /// `root_type_name` names the root class when the root schema has an
    /// object shape; see [`root_type_name`].
    pub fn generate(
        &self,
        mut graph: SchemaGraph,
        root_type_name: &str,
    ) -> SgenResult<GeneratedCode> {
        self.settings.validate()?;

        let report = normalize(&mut graph);
        debug!(
            definitions = graph.definitions().len(),
            anchors = report.anchors_synthesized + report.anchors_promoted,
            edges = report.edges_added,
            "normalized schema"
        );

        let (models, root) = build_models(&graph, root_type_name);
        debug!(models = models.len(), root = ?root, "resolved type models");

        let artifacts = self.emit(&models, root.as_deref());
        debug!(artifacts = artifacts.len(), "emitted artifacts");

        let code = self.assemble(&artifacts);
        Ok(GeneratedCode {
            models,
            artifacts,
            code,
        })
    }

    fn emit(&self, models: &[TypeModel], root: Option<&str>) -> Vec<CodeArtifact> {
        let types: Vec<CodeArtifact> = models
            .iter()
            .map(|model| match model {
                TypeModel::Class(class) => emit_class(class, &self.settings),
                TypeModel::Enum(enumeration) => emit_enum(enumeration, &self.settings),
            })
            .collect();
        let mut artifacts = order_by_inheritance(types);
        artifacts.extend(emit_support_types(models, &self.settings));
        artifacts.extend(emit_serializers(models, root, &self.settings));
        artifacts.extend(emit_workflow_operators(models, root, &self.settings));
        artifacts
    }

    fn assemble(&self, artifacts: &[CodeArtifact]) -> String {
        let mut code = format!(
            "//----------------------\n// <auto-generated>\n//     Generated by {} v{}\n// </auto-generated>\n//----------------------\n\n",
            self.settings.generator_name, self.settings.generator_version
        );
        code.push_str(&format!(
            "namespace {}\n{{\n    #pragma warning disable // Disable all warnings\n",
            self.settings.namespace
        ));
        for artifact in artifacts {
            code.push('\n');
            code.push_str(&csharp::indent(&artifact.code, 1));
        }
        code.push_str("}\n");
        code
    }
}

/// Resolve the root and every definition, then build all reached models
///
/// Returns the models and the name of the root class, if the root is one.
fn build_models(graph: &SchemaGraph, root_type_name: &str) -> (Vec<TypeModel>, Option<String>) {
    let mut builder = ModelBuilder::new(graph);
    let resolver = builder.resolver();

    let root = graph.actual(graph.root());
    let root_node = graph.node(root);
    let root_class = if root_node.has_object_shape() || root_node.is_enumeration() {
        match resolver.resolve(root, Some(root_type_name)) {
            TypeRef::Nominal(nominal) if nominal.schema.is_some() => Some(nominal.name),
            _ => None,
        }
    } else {
        None
    };

    for (name, id) in graph.definitions() {
        resolver.resolve(*id, Some(name));
    }

    let models = builder.build_all();
    let root_class = root_class.filter(|name| {
        models
            .iter()
            .any(|model| model.as_class().is_some_and(|class| class.name == *name))
    });
    (models, root_class)
}

/// Name of the root type: the override if given, otherwise the schema
/// title when it is a plain identifier
pub fn root_type_name(graph: &SchemaGraph, override_name: Option<&str>) -> SgenResult<String> {
    if let Some(name) = override_name.filter(|name| !name.is_empty()) {
        return Ok(name.to_string());
    }
    graph
        .node(graph.root())
        .title
        .as_deref()
        .filter(|title| is_type_name_title(title))
        .map(str::to_string)
        .ok_or(SgenError::MissingRootTypeName)
}

fn is_type_name_title(title: &str) -> bool {
    !title.is_empty() && title.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
