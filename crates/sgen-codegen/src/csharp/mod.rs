//! C# emitters
//!
//! One emitter per kind of artifact:
//!
//! - [`emit_class`] and [`emit_enum`] render model types
//! - [`emit_support_types`] renders the discriminator registry, converters
//!   and attributes, only when some class declares a discriminator
//! - [`emit_serializers`] renders the per-library serialization helpers
//! - [`emit_workflow_operators`] renders the reactive operators, only when
//!   they are enabled
//!
//! Emitters write at column zero. The generator indents every artifact into
//! the namespace block when assembling the file.

mod class;
mod enumeration;
mod operators;
mod serializers;
mod support;

pub use class::emit_class;
pub use enumeration::emit_enum;
pub use operators::emit_workflow_operators;
pub use serializers::emit_serializers;
pub use support::emit_support_types;

use crate::resolver::{Primitive, TypeRef};
use serde_json::Value;
use sgen_core::GeneratorSettings;

/// C# spelling of a primitive
pub fn primitive_keyword(primitive: Primitive) -> &'static str {
    match primitive {
        Primitive::Boolean => "bool",
        Primitive::Byte => "byte",
        Primitive::Short => "short",
        Primitive::Int => "int",
        Primitive::UInt => "uint",
        Primitive::Long => "long",
        Primitive::ULong => "ulong",
        Primitive::Float => "float",
        Primitive::Double => "double",
        Primitive::Decimal => "decimal",
        Primitive::String => "string",
        Primitive::DateTimeOffset => "System.DateTimeOffset",
        Primitive::TimeSpan => "System.TimeSpan",
        Primitive::Guid => "System.Guid",
        Primitive::Object => "object",
    }
}

/// C# spelling of a resolved type
///
/// # Examples
///
/// ```
/// use sgen_codegen::csharp::render_type;
/// use sgen_codegen::resolver::{Primitive, TypeRef};
///
/// let list = TypeRef::Array(Box::new(TypeRef::Primitive(Primitive::String)));
/// assert_eq!(render_type(&list), "System.Collections.Generic.List<string>");
///
/// let count = TypeRef::Nullable(Box::new(TypeRef::Primitive(Primitive::Int)));
/// assert_eq!(render_type(&count), "int?");
/// ```
pub fn render_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Primitive(primitive) => primitive_keyword(*primitive).to_string(),
        TypeRef::Nominal(nominal) => nominal.name.clone(),
        TypeRef::Array(element) => {
            format!("System.Collections.Generic.List<{}>", render_type(element))
        }
        TypeRef::Dictionary(key, value) => format!(
            "System.Collections.Generic.Dictionary<{}, {}>",
            render_type(key),
            render_type(value)
        ),
        TypeRef::Nullable(inner) if inner.is_value_type() => format!("{}?", render_type(inner)),
        TypeRef::Nullable(inner) => render_type(inner),
    }
}

/// Quoted and escaped C# string literal
///
/// # Examples
///
/// ```
/// use sgen_codegen::csharp::string_literal;
///
/// assert_eq!(string_literal("say \"hi\""), r#""say \"hi\"""#);
/// ```
pub fn string_literal(value: &str) -> String {
    let mut literal = String::with_capacity(value.len() + 2);
    literal.push('"');
    for c in value.chars() {
        match c {
            '\\' => literal.push_str("\\\\"),
            '"' => literal.push_str("\\\""),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            '\0' => literal.push_str("\\0"),
            c if c.is_control() => literal.push_str(&format!("\\u{:04x}", c as u32)),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}

/// Scalar default rendered as an initializer for a member of type `ty`
pub fn render_literal(value: &Value, ty: &TypeRef) -> String {
    let primitive = match ty.non_null() {
        TypeRef::Primitive(primitive) => *primitive,
        _ => Primitive::Object,
    };
    match value {
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Null => "null".to_string(),
        Value::Number(number) => {
            let suffix = match primitive {
                Primitive::Long => "L",
                Primitive::ULong => "UL",
                Primitive::UInt => "U",
                Primitive::Float => "F",
                Primitive::Double => "D",
                Primitive::Decimal => "M",
                _ => "",
            };
            format!("{number}{suffix}")
        }
        Value::String(text) => {
            let literal = string_literal(text);
            match primitive {
                Primitive::DateTimeOffset => format!("System.DateTimeOffset.Parse({literal})"),
                Primitive::TimeSpan => format!("System.TimeSpan.Parse({literal})"),
                Primitive::Guid => format!("System.Guid.Parse({literal})"),
                _ => literal,
            }
        }
        Value::Array(_) | Value::Object(_) => "null".to_string(),
    }
}

/// Whether `XmlSerializer` can handle a member of type `ty` directly
pub fn is_xml_serializable(ty: &TypeRef) -> bool {
    match ty {
        TypeRef::Primitive(primitive) => !matches!(
            primitive,
            Primitive::Object | Primitive::DateTimeOffset | Primitive::TimeSpan | Primitive::Guid
        ),
        // `string` renders the same with or without nullability
        TypeRef::Nullable(inner) if !inner.is_value_type() => is_xml_serializable(inner),
        _ => false,
    }
}

/// `GeneratedCodeAttribute` line stamped on every type
pub fn generated_code_attribute(settings: &GeneratorSettings) -> String {
    format!(
        "[System.CodeDom.Compiler.GeneratedCodeAttribute({}, {})]\n",
        string_literal(&settings.generator_name),
        string_literal(&settings.generator_version)
    )
}

/// XML documentation `<summary>` block, or nothing without a description
pub fn summary(description: Option<&str>, indent: &str) -> String {
    let Some(description) = description.filter(|d| !d.trim().is_empty()) else {
        return String::new();
    };
    summary_lines(description.lines(), indent)
}

pub(crate) fn summary_lines<'a>(lines: impl IntoIterator<Item = &'a str>, indent: &str) -> String {
    let mut code = format!("{indent}/// <summary>\n");
    for line in lines {
        code.push_str(&format!("{indent}/// {}\n", escape_xml(line.trim_end())));
    }
    code.push_str(&format!("{indent}/// </summary>\n"));
    code
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Indent every non-empty line by `levels` steps of four spaces
pub fn indent(code: &str, levels: usize) -> String {
    let prefix = "    ".repeat(levels);
    let mut indented = String::with_capacity(code.len());
    for line in code.lines() {
        if !line.is_empty() {
            indented.push_str(&prefix);
            indented.push_str(line);
        }
        indented.push('\n');
    }
    indented
}
