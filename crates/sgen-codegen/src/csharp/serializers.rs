//! Per-library serialization helpers
//!
//! One static class per enabled serializer library. Each offers generic
//! `Serialize<T>`/`Deserialize<T>` entry points, a typed `Serialize`
//! overload for every concrete class and, when the schema has a root type,
//! a `Deserialize(string)` returning it.

use super::{generated_code_attribute, string_literal};
use crate::artifact::{ArtifactKind, CodeArtifact};
use crate::model::{ClassModel, TypeModel};
use sgen_core::{GeneratorSettings, SerializerLibrary};

pub fn emit_serializers(
    models: &[TypeModel],
    root: Option<&str>,
    settings: &GeneratorSettings,
) -> Vec<CodeArtifact> {
    let classes: Vec<&ClassModel> = models.iter().filter_map(TypeModel::as_class).collect();
    settings
        .serializers
        .iter()
        .map(|library| emit_serializer(library, &classes, root, settings))
        .collect()
}

fn emit_serializer(
    library: SerializerLibrary,
    classes: &[&ClassModel],
    root: Option<&str>,
    settings: &GeneratorSettings,
) -> CodeArtifact {
    let name = match library {
        SerializerLibrary::Json => "JsonSerialization",
        SerializerLibrary::Yaml => "YamlSerialization",
    };

    let mut code = generated_code_attribute(settings);
    code.push_str(&format!("public static partial class {name}\n{{\n"));
    match library {
        SerializerLibrary::Json => code.push_str(JSON_CORE),
        SerializerLibrary::Yaml => code.push_str(&yaml_core(classes)),
    }

    for class in classes.iter().filter(|class| !class.is_abstract) {
        code.push_str(&format!(
            "\n    public static string Serialize({0} value)\n    {{\n        return Serialize<{0}>(value);\n    }}\n",
            class.name
        ));
    }
    if let Some(root) = root {
        code.push_str(&format!(
            "\n    public static {root} Deserialize(string value)\n    {{\n        return Deserialize<{root}>(value);\n    }}\n"
        ));
    }
    code.push_str("}\n");

    CodeArtifact::new(name, ArtifactKind::Support, code)
}

const JSON_CORE: &str = r#"    public static string Serialize<T>(T value)
    {
        return Newtonsoft.Json.JsonConvert.SerializeObject(value, Newtonsoft.Json.Formatting.Indented);
    }

    public static T Deserialize<T>(string value)
    {
        return Newtonsoft.Json.JsonConvert.DeserializeObject<T>(value);
    }
"#;

fn yaml_core(classes: &[&ClassModel]) -> String {
    let discriminated: Vec<&&ClassModel> = classes
        .iter()
        .filter(|class| class.discriminator.is_some())
        .collect();

    // Serializer
    let mut code = String::from(
        "    private static readonly YamlDotNet.Serialization.ISerializer serializer = new YamlDotNet.Serialization.SerializerBuilder()\n",
    );
    if !discriminated.is_empty() {
        code.push_str(
            "        .WithTypeInspector(inner => new YamlDiscriminatorTypeInspector(inner))\n",
        );
    }
    code.push_str(
        "        .ConfigureDefaultValuesHandling(YamlDotNet.Serialization.DefaultValuesHandling.OmitNull)\n        .Build();\n\n",
    );

    // Deserializer
    code.push_str(
        "    private static readonly YamlDotNet.Serialization.IDeserializer deserializer = new YamlDotNet.Serialization.DeserializerBuilder()\n        .IgnoreUnmatchedProperties()\n",
    );
    if !discriminated.is_empty() {
        code.push_str("        .WithTypeDiscriminatingNodeDeserializer(options =>\n        {\n");
        for class in &discriminated {
            if let Some(discriminator) = &class.discriminator {
                code.push_str(&format!(
                    "            options.AddKeyValueTypeDiscriminator<{0}>({1}, DiscriminatorTypeRegistry.GetMapping(typeof({0})).Types);\n",
                    class.name,
                    string_literal(&discriminator.property_name)
                ));
            }
        }
        code.push_str("        })\n");
    }
    code.push_str("        .Build();\n\n");

    code.push_str(
        r#"    public static string Serialize<T>(T value)
    {
        return serializer.Serialize(value);
    }

    public static T Deserialize<T>(string value)
    {
        return deserializer.Deserialize<T>(value);
    }
"#,
    );
    code
}
