//! Reactive workflow operators
//!
//! Emitted only when `workflow_operators` is enabled:
//!
//! - `Match<Base>` for every class with derived classes, filtering an
//!   `IObservable<object>` down to the selected subtype
//! - `SerializeTo<Format>`/`DeserializeFrom<Format>` per enabled serializer
//!   library, with a `Process` overload per class
//!
//! The per-class `Generate` source lives on the classes themselves, see
//! [`emit_class`](super::emit_class).

use super::{generated_code_attribute, string_literal, summary};
use crate::artifact::{ArtifactKind, CodeArtifact};
use crate::model::{ClassModel, TypeModel};
use sgen_core::{GeneratorSettings, SerializerLibrary};

pub fn emit_workflow_operators(
    models: &[TypeModel],
    root: Option<&str>,
    settings: &GeneratorSettings,
) -> Vec<CodeArtifact> {
    if !settings.workflow_operators {
        return Vec::new();
    }
    let classes: Vec<&ClassModel> = models.iter().filter_map(TypeModel::as_class).collect();
    let Some(first) = classes.first() else {
        return Vec::new();
    };
    let default_type = root.unwrap_or(first.name.as_str());

    let mut artifacts: Vec<CodeArtifact> = classes
        .iter()
        .filter(|class| !class.derived.is_empty())
        .map(|class| type_match(class, settings))
        .collect();
    for library in settings.serializers.iter() {
        artifacts.push(serialize_operator(library, &classes, settings));
        artifacts.push(deserialize_operator(library, &classes, default_type, settings));
    }
    artifacts
}

fn type_mapping_includes(names: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    names
        .into_iter()
        .map(|name| {
            format!(
                "[System.Xml.Serialization.XmlIncludeAttribute(typeof(Bonsai.Expressions.TypeMapping<{}>))]\n",
                name.as_ref()
            )
        })
        .collect()
}

fn type_match(base: &ClassModel, settings: &GeneratorSettings) -> CodeArtifact {
    let name = format!("Match{}", base.name);
    let mut code = generated_code_attribute(settings);
    code.push_str("[System.ComponentModel.DefaultPropertyAttribute(\"Type\")]\n");
    code.push_str("[Bonsai.WorkflowElementCategoryAttribute(Bonsai.ElementCategory.Combinator)]\n");
    code.push_str(&type_mapping_includes(&base.derived));
    code.push_str(&format!(
        r#"public partial class {name} : Bonsai.Expressions.SingleArgumentExpressionBuilder
{{

    public Bonsai.Expressions.TypeMapping Type {{ get; set; }}

    public override System.Linq.Expressions.Expression Build(System.Collections.Generic.IEnumerable<System.Linq.Expressions.Expression> arguments)
    {{
        var typeMapping = Type;
        var returnType = typeMapping != null ? typeMapping.GetType().GetGenericArguments()[0] : typeof({base});
        return System.Linq.Expressions.Expression.Call(
            typeof({name}),
            "Process",
            new System.Type[] {{ returnType }},
            System.Linq.Enumerable.Single(arguments));
    }}

    private static System.IObservable<TResult> Process<TResult>(System.IObservable<object> source)
        where TResult : {base}
    {{
        return System.Reactive.Linq.Observable.Create<TResult>(observer =>
        {{
            var sourceObserver = System.Reactive.Observer.Create<object>(
                value =>
                {{
                    var match = value as TResult;
                    if (match != null) observer.OnNext(match);
                }},
                observer.OnError,
                observer.OnCompleted);
            return System.ObservableExtensions.SubscribeSafe(source, sourceObserver);
        }});
    }}
}}
"#,
        base = base.name
    ));
    CodeArtifact::new(name, ArtifactKind::Support, code)
}

fn format_name(library: SerializerLibrary) -> &'static str {
    match library {
        SerializerLibrary::Json => "Json",
        SerializerLibrary::Yaml => "Yaml",
    }
}

/// Type attributes shared by every operator: summary and description
fn described(description: &str, settings: &GeneratorSettings) -> String {
    let mut code = summary(Some(description), "");
    code.push_str(&generated_code_attribute(settings));
    code.push_str(&format!(
        "[System.ComponentModel.DescriptionAttribute({})]\n",
        string_literal(description)
    ));
    code
}

fn serialize_operator(
    library: SerializerLibrary,
    classes: &[&ClassModel],
    settings: &GeneratorSettings,
) -> CodeArtifact {
    let format = format_name(library);
    let name = format!("SerializeTo{format}");
    let mut code = described(
        &format!("Serializes a sequence of data model objects into {} strings.", format.to_uppercase()),
        settings,
    );
    code.push_str("[Bonsai.WorkflowElementCategoryAttribute(Bonsai.ElementCategory.Transform)]\n");
    code.push_str("[Bonsai.CombinatorAttribute()]\n");
    code.push_str(&format!("public partial class {name}\n{{\n"));
    match library {
        SerializerLibrary::Json => code.push_str(
            r#"
    public Newtonsoft.Json.Formatting Formatting { get; set; }

    private System.IObservable<string> Process<T>(System.IObservable<T> source)
    {
        var formatting = Formatting;
        return System.Reactive.Linq.Observable.Select(source, value => Newtonsoft.Json.JsonConvert.SerializeObject(value, formatting));
    }
"#,
        ),
        SerializerLibrary::Yaml => code.push_str(
            r#"
    private System.IObservable<string> Process<T>(System.IObservable<T> source)
    {
        return System.Reactive.Linq.Observable.Select(source, value => YamlSerialization.Serialize<T>(value));
    }
"#,
        ),
    }
    for class in classes {
        code.push_str(&format!(
            "\n    public System.IObservable<string> Process(System.IObservable<{0}> source)\n    {{\n        return Process<{0}>(source);\n    }}\n",
            class.name
        ));
    }
    code.push_str("}\n");
    CodeArtifact::new(name, ArtifactKind::Support, code)
}

fn deserialize_operator(
    library: SerializerLibrary,
    classes: &[&ClassModel],
    default_type: &str,
    settings: &GeneratorSettings,
) -> CodeArtifact {
    let format = format_name(library);
    let name = format!("DeserializeFrom{format}");
    let mut code = described(
        &format!("Deserializes a sequence of {} strings into data model objects.", format.to_uppercase()),
        settings,
    );
    code.push_str("[System.ComponentModel.DefaultPropertyAttribute(\"Type\")]\n");
    code.push_str("[Bonsai.WorkflowElementCategoryAttribute(Bonsai.ElementCategory.Transform)]\n");
    code.push_str(&type_mapping_includes(classes.iter().map(|class| &class.name)));
    code.push_str(&format!(
        r#"public partial class {name} : Bonsai.Expressions.SingleArgumentExpressionBuilder
{{

    public {name}()
    {{
        Type = new Bonsai.Expressions.TypeMapping<{default_type}>();
    }}

    public Bonsai.Expressions.TypeMapping Type {{ get; set; }}

    public override System.Linq.Expressions.Expression Build(System.Collections.Generic.IEnumerable<System.Linq.Expressions.Expression> arguments)
    {{
        var typeMapping = (Bonsai.Expressions.TypeMapping)Type;
        var returnType = typeMapping.GetType().GetGenericArguments()[0];
        return System.Linq.Expressions.Expression.Call(
            typeof({name}),
            "Process",
            new System.Type[] {{ returnType }},
            System.Linq.Enumerable.Single(arguments));
    }}

    private static System.IObservable<T> Process<T>(System.IObservable<string> source)
    {{
        return System.Reactive.Linq.Observable.Select(source, value => {format}Serialization.Deserialize<T>(value));
    }}
}}
"#
    ));
    CodeArtifact::new(name, ArtifactKind::Support, code)
}
