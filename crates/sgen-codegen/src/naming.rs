//! Identifier naming for generated C# code.
//!
//! Schema keys and enumeration literals are arbitrary strings. This module
//! turns them into identifiers that are valid C#, follow .NET casing, and do
//! not collide within their scope.
//!
//! # Conversions
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `snake_case_key` | [`to_pascal_case`] | `SnakeCaseKey` |
//! | `This is a string` | [`to_pascal_case`] | `ThisIsAString` |
//! | `BarWithDefault` | [`to_field_name`] | `_barWithDefault` |
//! | `class` | [`sanitize_identifier`] | `class_` |
//!
//! # Scopes
//!
//! - [`TypeNamer`] hands out one name per schema identity for the whole run
//! - [`MemberScope`] hands out member or enumeration constant names inside
//!   one enclosing type

use once_cell::sync::Lazy;
use serde_json::Value;
use sgen_schema::SchemaId;
use std::collections::{HashMap, HashSet};

/// Fallback identifier for schemas without any usable name
pub const ANONYMOUS_TYPE_NAME: &str = "Anonymous";

/// Names of the support types emitted next to the model types
pub const RESERVED_TYPE_NAMES: &[&str] = &[
    "JsonInheritanceAttribute",
    "JsonInheritanceConverter",
    "DiscriminatorTypeRegistry",
    "DiscriminatorMapping",
    "DiscriminatorPropertyDescriptor",
    "YamlDiscriminatorAttribute",
    "YamlDiscriminatorTypeInspector",
    "JsonSerialization",
    "YamlSerialization",
];

static CSHARP_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
        "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
        "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
        "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
        "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
        "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed",
        "short", "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw",
        "true", "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using",
        "virtual", "void", "volatile", "while",
    ]
    .into_iter()
    .collect()
});

/// Check whether a word is a reserved C# keyword.
pub fn is_keyword(word: &str) -> bool {
    CSHARP_KEYWORDS.contains(word)
}

/// Convert an arbitrary string to PascalCase.
///
/// Every run of characters that are not letters or digits separates words.
/// The first character of each word is uppercased and the rest is kept.
///
/// # Examples
///
/// ```
/// use sgen_codegen::naming::to_pascal_case;
///
/// assert_eq!(to_pascal_case("thing_container"), "ThingContainer");
/// assert_eq!(to_pascal_case("This is a string A"), "ThisIsAStringA");
/// assert_eq!(to_pascal_case("kebab-case"), "KebabCase");
/// assert_eq!(to_pascal_case("camelCase"), "CamelCase");
/// ```
pub fn to_pascal_case(s: &str) -> String {
    s.split(|c: char| !c.is_alphanumeric())
        .map(capitalize)
        .collect()
}

/// Capitalize the first letter of a string.
///
/// # Examples
///
/// ```
/// use sgen_codegen::naming::capitalize;
///
/// assert_eq!(capitalize("hello"), "Hello");
/// assert_eq!(capitalize(""), "");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Backing field name for a member identifier.
///
/// # Examples
///
/// ```
/// use sgen_codegen::naming::to_field_name;
///
/// assert_eq!(to_field_name("BarWithDefault"), "_barWithDefault");
/// assert_eq!(to_field_name("Name"), "_name");
/// ```
pub fn to_field_name(member: &str) -> String {
    let mut chars = member.chars();
    match chars.next() {
        None => "_".to_string(),
        Some(first) => std::iter::once('_')
            .chain(first.to_lowercase())
            .chain(chars)
            .collect(),
    }
}

/// Make a candidate identifier valid C#.
///
/// - an empty candidate becomes [`ANONYMOUS_TYPE_NAME`]
/// - a leading digit gets an underscore prefix
/// - a keyword gets an underscore suffix
pub fn sanitize_identifier(candidate: &str) -> String {
    if candidate.is_empty() {
        return ANONYMOUS_TYPE_NAME.to_string();
    }
    if candidate.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("_{candidate}");
    }
    if is_keyword(candidate) {
        return format!("{candidate}_");
    }
    candidate.to_string()
}

/// PascalCase a hint and make it a valid identifier
pub fn to_identifier(hint: &str) -> String {
    sanitize_identifier(&to_pascal_case(hint))
}

/// Textual hint for an enumeration literal.
fn literal_hint(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "Null".to_string(),
        Value::Number(n) => {
            let text = n.to_string();
            match text.strip_prefix('-') {
                Some(magnitude) => format!("Minus{magnitude}"),
                None => text,
            }
        }
        Value::Array(_) | Value::Object(_) => "Value".to_string(),
    }
}

/// Append the first free ordinal suffix (2, 3, ...) to a taken name.
fn first_free(base: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&base) {
        return base;
    }
    let mut ordinal = 2;
    loop {
        let candidate = format!("{base}{ordinal}");
        if !taken.contains(&candidate) {
            return candidate;
        }
        ordinal += 1;
    }
}

/// Run-wide type name registry keyed by schema identity
///
/// The same schema always receives the same name. Distinct schemas never
/// share one.
#[derive(Debug, Clone)]
pub struct TypeNamer {
    assigned: HashMap<SchemaId, String>,
    taken: HashSet<String>,
}

impl Default for TypeNamer {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeNamer {
    pub fn new() -> Self {
        Self {
            assigned: HashMap::new(),
            taken: RESERVED_TYPE_NAMES.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// Name for `schema`, derived from the first usable hint
    ///
    /// A schema that already has a name keeps it regardless of `hints`.
    pub fn name_type<'a>(
        &mut self,
        schema: SchemaId,
        hints: impl IntoIterator<Item = &'a str>,
    ) -> String {
        if let Some(name) = self.assigned.get(&schema) {
            return name.clone();
        }
        let base = hints
            .into_iter()
            .map(to_pascal_case)
            .find(|hint| !hint.is_empty())
            .map(|hint| sanitize_identifier(&hint))
            .unwrap_or_else(|| ANONYMOUS_TYPE_NAME.to_string());
        let name = first_free(base, &self.taken);
        tracing::trace!(%schema, %name, "named type");
        self.taken.insert(name.clone());
        self.assigned.insert(schema, name.clone());
        name
    }

    /// Name previously assigned to `schema`
    pub fn type_name(&self, schema: SchemaId) -> Option<&str> {
        self.assigned.get(&schema).map(String::as_str)
    }
}

/// Member or enumeration constant names inside one enclosing type
#[derive(Debug, Clone)]
pub struct MemberScope {
    enclosing: String,
    taken: HashSet<String>,
}

impl MemberScope {
    pub fn new(enclosing: impl Into<String>) -> Self {
        let enclosing = enclosing.into();
        Self {
            taken: HashSet::from([enclosing.clone()]),
            enclosing,
        }
    }

    fn claim(&mut self, mut identifier: String) -> String {
        if identifier == self.enclosing {
            identifier.push('_');
        }
        let name = first_free(identifier, &self.taken);
        self.taken.insert(name.clone());
        name
    }

    /// Member identifier for a property key
    ///
    /// # Examples
    ///
    /// ```
    /// use sgen_codegen::naming::MemberScope;
    ///
    /// let mut scope = MemberScope::new("Container");
    /// assert_eq!(scope.name_member("base_type"), "BaseType");
    /// assert_eq!(scope.name_member("container"), "Container_");
    /// assert_eq!(scope.name_member("base-type"), "BaseType2");
    /// ```
    pub fn name_member(&mut self, key: &str) -> String {
        self.claim(to_identifier(key))
    }

    /// Constant identifier for the enumeration literal at `index`
    ///
    /// An explicit name hint (from `x-enumNames`) wins over the literal.
    pub fn name_enum_value(&mut self, index: usize, hint: Option<&str>, value: &Value) -> String {
        let text = match hint.filter(|h| !h.is_empty()) {
            Some(hint) => hint.to_string(),
            None => literal_hint(value),
        };
        let identifier = to_pascal_case(&text);
        let identifier = if identifier.is_empty() {
            format!("Value{index}")
        } else {
            sanitize_identifier(&identifier)
        };
        self.claim(identifier)
    }
}
