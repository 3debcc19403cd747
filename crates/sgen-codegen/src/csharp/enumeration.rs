//! Enumeration emission

use super::{generated_code_attribute, string_literal, summary, summary_lines};
use crate::artifact::{ArtifactKind, CodeArtifact};
use crate::model::EnumModel;
use sgen_core::GeneratorSettings;

pub fn emit_enum(model: &EnumModel, settings: &GeneratorSettings) -> CodeArtifact {
    let mut code = String::new();

    // Integer enums list value = name pairs after the description
    if model.is_integer {
        let mut lines: Vec<String> = model
            .description
            .iter()
            .flat_map(|d| d.lines())
            .map(str::to_string)
            .collect();
        lines.extend(
            model
                .members
                .iter()
                .map(|member| format!("{} = {}", member.wire_value, member.name)),
        );
        code.push_str(&summary_lines(lines.iter().map(String::as_str), ""));
    } else {
        code.push_str(&summary(model.description.as_deref(), ""));
    }
    code.push_str(&generated_code_attribute(settings));
    if settings.serializers.json() && !model.is_integer {
        code.push_str(
            "[Newtonsoft.Json.JsonConverter(typeof(Newtonsoft.Json.Converters.StringEnumConverter))]\n",
        );
    }
    code.push_str(&format!("public enum {}\n{{\n", model.name));

    for member in &model.members {
        let wire = string_literal(&member.wire_value);
        code.push('\n');
        if settings.serializers.json() {
            code.push_str(&format!(
                "    [System.Runtime.Serialization.EnumMemberAttribute(Value={wire})]\n"
            ));
        }
        if settings.serializers.yaml() {
            code.push_str(&format!(
                "    [YamlDotNet.Serialization.YamlMemberAttribute(Alias={wire})]\n"
            ));
        }
        code.push_str(&format!("    {} = {},\n", member.name, member.value));
    }
    code.push_str("}\n");

    CodeArtifact::new(&model.name, ArtifactKind::Enum, code)
}
