//! Class emission

use super::{
    generated_code_attribute, is_xml_serializable, render_literal, render_type, string_literal,
    summary,
};
use crate::artifact::{ArtifactKind, CodeArtifact};
use crate::model::{ClassModel, DefaultAssignment, DefaultValue, Member};
use crate::resolver::{Primitive, TypeRef};
use sgen_core::GeneratorSettings;

/// Render a class with its fields, constructors, properties and
/// value-semantics helpers
pub fn emit_class(model: &ClassModel, settings: &GeneratorSettings) -> CodeArtifact {
    let mut code = String::new();

    // Type attributes
    code.push_str(&summary(model.description.as_deref(), ""));
    code.push_str(&generated_code_attribute(settings));
    if let Some(description) = &model.description {
        code.push_str(&format!(
            "[System.ComponentModel.DescriptionAttribute({})]\n",
            string_literal(description)
        ));
    }
    if let Some(discriminator) = &model.discriminator {
        let property = string_literal(&discriminator.property_name);
        if settings.serializers.json() {
            code.push_str(&format!(
                "[Newtonsoft.Json.JsonConverter(typeof(JsonInheritanceConverter), {property})]\n"
            ));
        }
        if settings.serializers.yaml() {
            code.push_str(&format!("[YamlDiscriminator({property})]\n"));
        }
        for (value, type_name) in &discriminator.mapping {
            code.push_str(&format!(
                "[JsonInheritanceAttribute({}, typeof({type_name}))]\n",
                string_literal(value)
            ));
        }
    }

    if settings.workflow_operators && !model.is_abstract {
        code.push_str("[Bonsai.WorkflowElementCategoryAttribute(Bonsai.ElementCategory.Source)]\n");
        code.push_str("[Bonsai.CombinatorAttribute(\"Generate\")]\n");
    }

    // Declaration
    let modifiers = if model.is_abstract {
        "public abstract partial class"
    } else {
        "public partial class"
    };
    match &model.base {
        Some(base) => code.push_str(&format!("{modifiers} {} : {base}\n", model.name)),
        None => code.push_str(&format!("{modifiers} {}\n", model.name)),
    }
    code.push_str("{\n");

    for member in &model.members {
        code.push_str(&format!(
            "\n    private {} {};\n",
            render_type(&member.ty),
            member.field_name
        ));
    }

    code.push_str(&default_constructor(model));
    code.push_str(&copy_constructor(model));

    for member in &model.members {
        code.push_str(&property(member, settings));
        code.push_str(&xml_surrogate(member, settings));
    }

    if settings.workflow_operators && !model.is_abstract {
        code.push_str(&generate_source(&model.name));
    }
    code.push_str(&print_members(model));
    if model.is_root() {
        code.push_str(TO_STRING);
    }
    code.push_str("}\n");

    CodeArtifact::new(&model.name, ArtifactKind::Class, code).with_base(model.base.clone())
}

fn default_constructor(model: &ClassModel) -> String {
    let access = if model.is_abstract { "protected" } else { "public" };
    let mut statements = Vec::new();
    for member in &model.members {
        match &member.default {
            Some(value) => initialize(&member.field_name, &member.ty, value, &mut statements),
            None if member.ty.is_array() => statements.push(format!(
                "{} = new {}();",
                member.field_name,
                render_type(member.ty.non_null())
            )),
            None => {}
        }
    }
    let mut code = format!("\n    {access} {}()\n    {{\n", model.name);
    for statement in statements {
        code.push_str(&format!("        {statement}\n"));
    }
    code.push_str("    }\n");
    code
}

/// Statements assigning `value` to `target`, expanding nested object
/// defaults into a fresh instance followed by its own assignments
fn initialize(target: &str, ty: &TypeRef, value: &DefaultValue, statements: &mut Vec<String>) {
    match value {
        DefaultValue::Literal(literal) => {
            statements.push(format!("{target} = {};", render_literal(literal, ty)));
        }
        DefaultValue::EnumMember { type_name, member } => {
            statements.push(format!("{target} = {type_name}.{member};"));
        }
        DefaultValue::Object {
            type_name,
            assignments,
        } => {
            statements.push(format!("{target} = new {type_name}();"));
            for DefaultAssignment { member, ty, value } in assignments {
                initialize(&format!("{target}.{member}"), ty, value, statements);
            }
        }
    }
}

fn copy_constructor(model: &ClassModel) -> String {
    let mut code = format!("\n    protected {0}({0} other)", model.name);
    if model.base.is_some() {
        code.push_str(" : \n            base(other)");
    }
    code.push_str("\n    {\n");
    for member in &model.members {
        let field = &member.field_name;
        match member.ty.non_null() {
            collection @ (TypeRef::Array(_) | TypeRef::Dictionary(..)) => code.push_str(&format!(
                "        {field} = other.{field} != null ? new {}(other.{field}) : null;\n",
                render_type(collection)
            )),
            _ => code.push_str(&format!("        {field} = other.{field};\n")),
        }
    }
    code.push_str("    }\n");
    code
}

fn property(member: &Member, settings: &GeneratorSettings) -> String {
    let mut code = String::from("\n");
    code.push_str(&summary(member.description.as_deref(), "    "));
    if !is_xml_serializable(&member.ty) {
        code.push_str("    [System.Xml.Serialization.XmlIgnoreAttribute()]\n");
    }
    let wire = string_literal(&member.wire_name);
    if settings.serializers.json() {
        if member.required && settings.required_properties_must_be_defined {
            let required = if member.nullable { "AllowNull" } else { "Always" };
            code.push_str(&format!(
                "    [Newtonsoft.Json.JsonPropertyAttribute({wire}, Required=Newtonsoft.Json.Required.{required})]\n"
            ));
        } else {
            code.push_str(&format!("    [Newtonsoft.Json.JsonPropertyAttribute({wire})]\n"));
        }
    }
    if settings.serializers.yaml() {
        code.push_str(&format!(
            "    [YamlDotNet.Serialization.YamlMemberAttribute(Alias={wire})]\n"
        ));
    }
    if let Some(description) = &member.description {
        code.push_str(&format!(
            "    [System.ComponentModel.DescriptionAttribute({})]\n",
            string_literal(description)
        ));
    }
    code.push_str(&format!(
        "    public {} {}\n    {{\n        get\n        {{\n            return {field};\n        }}\n        set\n        {{\n            {field} = value;\n        }}\n    }}\n",
        render_type(&member.ty),
        member.name,
        field = member.field_name,
    ));
    code
}

/// `<Name>Xml` string property standing in for a date or duration member
/// under `XmlSerializer`
fn xml_surrogate(member: &Member, settings: &GeneratorSettings) -> String {
    let (read, write) = match member.ty.non_null() {
        TypeRef::Primitive(Primitive::DateTimeOffset) => (
            "System.Xml.XmlConvert.ToString",
            "System.Xml.XmlConvert.ToDateTimeOffset",
        ),
        TypeRef::Primitive(Primitive::TimeSpan) => (
            "System.Xml.XmlConvert.ToString",
            "System.Xml.XmlConvert.ToTimeSpan",
        ),
        _ => return String::new(),
    };
    let field = &member.field_name;
    let (getter, setter) = if member.ty.is_nullable() {
        (
            format!("{field}.HasValue ? {read}({field}.Value) : null"),
            format!(
                "value != null ? {write}(value) : ({}?)null",
                render_type(member.ty.non_null())
            ),
        )
    } else {
        (format!("{read}({field})"), format!("{write}(value)"))
    };

    let mut code = format!(
        "\n    [System.Xml.Serialization.XmlElementAttribute({})]\n    [System.ComponentModel.BrowsableAttribute(false)]\n",
        string_literal(&member.wire_name)
    );
    if settings.serializers.json() {
        code.push_str("    [Newtonsoft.Json.JsonIgnoreAttribute()]\n");
    }
    if settings.serializers.yaml() {
        code.push_str("    [YamlDotNet.Serialization.YamlIgnoreAttribute()]\n");
    }
    code.push_str(&format!(
        "    public string {}Xml\n    {{\n        get\n        {{\n            return {getter};\n        }}\n        set\n        {{\n            {field} = {setter};\n        }}\n    }}\n",
        member.name
    ));
    code
}

/// `Generate` overloads emitting copies of the configured instance
fn generate_source(name: &str) -> String {
    format!(
        r#"
    public System.IObservable<{name}> Generate()
    {{
        return System.Reactive.Linq.Observable.Defer(() => System.Reactive.Linq.Observable.Return(new {name}(this)));
    }}

    public System.IObservable<{name}> Generate<TSource>(System.IObservable<TSource> source)
    {{
        return System.Reactive.Linq.Observable.Select(source, _ => new {name}(this));
    }}
"#
    )
}

fn print_members(model: &ClassModel) -> String {
    let modifier = if model.is_root() { "virtual" } else { "override" };
    let mut code = format!(
        "\n    protected {modifier} bool PrintMembers(System.Text.StringBuilder stringBuilder)\n    {{\n"
    );
    if !model.is_root() && model.members.is_empty() {
        code.push_str("        return base.PrintMembers(stringBuilder);\n    }\n");
        return code;
    }
    if !model.is_root() {
        code.push_str(
            "        if (base.PrintMembers(stringBuilder))\n        {\n            stringBuilder.Append(\", \");\n        }\n",
        );
    }
    let count = model.members.len();
    for (index, member) in model.members.iter().enumerate() {
        let separator = if index + 1 < count { " + \", \"" } else { "" };
        code.push_str(&format!(
            "        stringBuilder.Append(\"{} = \" + {}{separator});\n",
            member.name, member.field_name
        ));
    }
    let any = if count > 0 { "true" } else { "false" };
    code.push_str(&format!("        return {any};\n    }}\n"));
    code
}

const TO_STRING: &str = r#"
    public override string ToString()
    {
        System.Text.StringBuilder stringBuilder = new System.Text.StringBuilder();
        stringBuilder.Append(GetType().Name);
        stringBuilder.Append(" { ");
        if (PrintMembers(stringBuilder))
        {
            stringBuilder.Append(" ");
        }
        stringBuilder.Append("}");
        return stringBuilder.ToString();
    }
"#;
