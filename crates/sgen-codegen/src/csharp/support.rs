//! Runtime support types for discriminated hierarchies
//!
//! Emitted once per output when at least one class declares a
//! discriminator. `DiscriminatorTypeRegistry` is the single table both
//! serializer integrations consult: the JSON converter uses it to resolve
//! nested discriminators while reading and to stamp every discriminator on
//! the way out, the YAML inspector uses it to write the discriminator keys.

use super::{generated_code_attribute, string_literal};
use crate::artifact::{ArtifactKind, CodeArtifact};
use crate::model::{ClassModel, TypeModel};
use sgen_core::GeneratorSettings;

const DISCRIMINATOR_TYPE_REGISTRY: &str = "DiscriminatorTypeRegistry";

pub fn emit_support_types(models: &[TypeModel], settings: &GeneratorSettings) -> Vec<CodeArtifact> {
    let discriminated: Vec<&ClassModel> = models
        .iter()
        .filter_map(TypeModel::as_class)
        .filter(|class| class.discriminator.is_some())
        .collect();
    if discriminated.is_empty() {
        return Vec::new();
    }

    let stamp = generated_code_attribute(settings);
    let support = |name: &str, body: &str| {
        CodeArtifact::new(name, ArtifactKind::Support, format!("{stamp}{body}"))
    };

    let mut artifacts = vec![
        support("JsonInheritanceAttribute", JSON_INHERITANCE_ATTRIBUTE),
        support("DiscriminatorMapping", DISCRIMINATOR_MAPPING),
        support(DISCRIMINATOR_TYPE_REGISTRY, &registry(&discriminated)),
    ];
    if settings.serializers.json() {
        artifacts.push(support("JsonInheritanceConverter", JSON_INHERITANCE_CONVERTER));
    }
    if settings.serializers.yaml() {
        artifacts.push(support("YamlDiscriminatorAttribute", YAML_DISCRIMINATOR_ATTRIBUTE));
        artifacts.push(support(
            "DiscriminatorPropertyDescriptor",
            DISCRIMINATOR_PROPERTY_DESCRIPTOR,
        ));
        artifacts.push(support(
            "YamlDiscriminatorTypeInspector",
            YAML_DISCRIMINATOR_TYPE_INSPECTOR,
        ));
    }
    artifacts
}

fn registry(classes: &[&ClassModel]) -> String {
    let mut entries = String::new();
    for class in classes {
        let Some(discriminator) = &class.discriminator else {
            continue;
        };
        entries.push_str(&format!(
            "        {{ typeof({}), new DiscriminatorMapping({}, new System.Collections.Generic.Dictionary<string, System.Type>\n            {{\n",
            class.name,
            string_literal(&discriminator.property_name)
        ));
        for (value, type_name) in &discriminator.mapping {
            entries.push_str(&format!(
                "                {{ {}, typeof({type_name}) }},\n",
                string_literal(value)
            ));
        }
        entries.push_str("            }) },\n");
    }
    REGISTRY_TEMPLATE.replace("{entries}", &entries)
}

const JSON_INHERITANCE_ATTRIBUTE: &str = r#"[System.AttributeUsage(System.AttributeTargets.Class | System.AttributeTargets.Interface, AllowMultiple = true)]
public class JsonInheritanceAttribute : System.Attribute
{
    public JsonInheritanceAttribute(string key, System.Type type)
    {
        Key = key;
        Type = type;
    }

    public string Key { get; }

    public System.Type Type { get; }
}
"#;

const DISCRIMINATOR_MAPPING: &str = r#"public sealed class DiscriminatorMapping
{
    public DiscriminatorMapping(string propertyName, System.Collections.Generic.IDictionary<string, System.Type> types)
    {
        PropertyName = propertyName;
        Types = types;
    }

    public string PropertyName { get; }

    public System.Collections.Generic.IDictionary<string, System.Type> Types { get; }
}
"#;

const REGISTRY_TEMPLATE: &str = r#"public static class DiscriminatorTypeRegistry
{
    private static readonly System.Collections.Generic.Dictionary<System.Type, DiscriminatorMapping> mappings = new System.Collections.Generic.Dictionary<System.Type, DiscriminatorMapping>
    {
{entries}    };

    public static DiscriminatorMapping GetMapping(System.Type type)
    {
        DiscriminatorMapping mapping;
        return mappings.TryGetValue(type, out mapping) ? mapping : null;
    }

    public static System.Type Resolve(System.Type baseType, string value)
    {
        var mapping = GetMapping(baseType);
        System.Type type;
        if (mapping == null || value == null || !mapping.Types.TryGetValue(value, out type))
        {
            return null;
        }
        return type;
    }

    public static bool TryGetDiscriminator(System.Type type, out string propertyName, out string value)
    {
        propertyName = null;
        value = null;
        var mapping = type.BaseType != null ? GetMapping(type.BaseType) : null;
        if (mapping == null)
        {
            return false;
        }
        foreach (var entry in mapping.Types)
        {
            if (entry.Value == type)
            {
                propertyName = mapping.PropertyName;
                value = entry.Key;
                return true;
            }
        }
        return false;
    }
}
"#;

const JSON_INHERITANCE_CONVERTER: &str = r#"public class JsonInheritanceConverter : Newtonsoft.Json.JsonConverter
{
    [System.ThreadStatic]
    private static bool isReading;

    [System.ThreadStatic]
    private static bool isWriting;

    private readonly string discriminatorName;

    public JsonInheritanceConverter(string discriminatorName)
    {
        this.discriminatorName = discriminatorName;
    }

    public string DiscriminatorName { get { return discriminatorName; } }

    public override bool CanWrite
    {
        get
        {
            if (isWriting)
            {
                isWriting = false;
                return false;
            }
            return true;
        }
    }

    public override bool CanRead
    {
        get
        {
            if (isReading)
            {
                isReading = false;
                return false;
            }
            return true;
        }
    }

    public override bool CanConvert(System.Type objectType)
    {
        return true;
    }

    public override void WriteJson(Newtonsoft.Json.JsonWriter writer, object value, Newtonsoft.Json.JsonSerializer serializer)
    {
        try
        {
            isWriting = true;
            var jObject = Newtonsoft.Json.Linq.JObject.FromObject(value, serializer);
            for (var type = value.GetType(); type != null; type = type.BaseType)
            {
                string propertyName;
                string discriminatorValue;
                if (DiscriminatorTypeRegistry.TryGetDiscriminator(type, out propertyName, out discriminatorValue) && jObject.Property(propertyName) == null)
                {
                    jObject.AddFirst(new Newtonsoft.Json.Linq.JProperty(propertyName, discriminatorValue));
                }
            }
            writer.WriteToken(jObject.CreateReader());
        }
        finally
        {
            isWriting = false;
        }
    }

    public override object ReadJson(Newtonsoft.Json.JsonReader reader, System.Type objectType, object existingValue, Newtonsoft.Json.JsonSerializer serializer)
    {
        var jObject = serializer.Deserialize<Newtonsoft.Json.Linq.JObject>(reader);
        if (jObject == null)
        {
            return null;
        }

        var type = objectType;
        DiscriminatorMapping mapping;
        while ((mapping = DiscriminatorTypeRegistry.GetMapping(type)) != null)
        {
            var token = jObject.GetValue(mapping.PropertyName);
            if (token == null)
            {
                break;
            }
            var discriminatorValue = token.Value<string>();
            var resolved = DiscriminatorTypeRegistry.Resolve(type, discriminatorValue);
            if (resolved == null)
            {
                throw new Newtonsoft.Json.JsonSerializationException("Could not find subtype of '" + type.Name + "' with discriminator '" + discriminatorValue + "'.");
            }
            type = resolved;
        }

        try
        {
            isReading = true;
            return serializer.Deserialize(jObject.CreateReader(), type);
        }
        finally
        {
            isReading = false;
        }
    }
}
"#;

const YAML_DISCRIMINATOR_ATTRIBUTE: &str = r#"[System.AttributeUsage(System.AttributeTargets.Class, AllowMultiple = false)]
public class YamlDiscriminatorAttribute : System.Attribute
{
    public YamlDiscriminatorAttribute(string propertyName)
    {
        PropertyName = propertyName;
    }

    public string PropertyName { get; }
}
"#;

const DISCRIMINATOR_PROPERTY_DESCRIPTOR: &str = r#"public sealed class DiscriminatorPropertyDescriptor : YamlDotNet.Serialization.IPropertyDescriptor
{
    private readonly string value;

    public DiscriminatorPropertyDescriptor(string name, string value)
    {
        Name = name;
        this.value = value;
    }

    public string Name { get; }

    public bool AllowNulls { get { return false; } }

    public bool CanWrite { get { return false; } }

    public System.Type Type { get { return typeof(string); } }

    public System.Type TypeOverride { get; set; }

    public int Order { get; set; }

    public YamlDotNet.Core.ScalarStyle ScalarStyle { get; set; }

    public bool Required { get { return true; } }

    public System.Type ConverterType { get { return null; } }

    public T GetCustomAttribute<T>() where T : System.Attribute
    {
        return null;
    }

    public YamlDotNet.Serialization.IObjectDescriptor Read(object target)
    {
        return new YamlDotNet.Serialization.ObjectDescriptor(value, typeof(string), typeof(string), ScalarStyle);
    }

    public void Write(object target, object value)
    {
    }
}
"#;

const YAML_DISCRIMINATOR_TYPE_INSPECTOR: &str = r#"public sealed class YamlDiscriminatorTypeInspector : YamlDotNet.Serialization.TypeInspectors.TypeInspectorSkeleton
{
    private readonly YamlDotNet.Serialization.ITypeInspector inner;

    public YamlDiscriminatorTypeInspector(YamlDotNet.Serialization.ITypeInspector inner)
    {
        this.inner = inner;
    }

    public override string GetEnumName(System.Type enumType, string name)
    {
        return inner.GetEnumName(enumType, name);
    }

    public override string GetEnumValue(object enumValue)
    {
        return inner.GetEnumValue(enumValue);
    }

    public override System.Collections.Generic.IEnumerable<YamlDotNet.Serialization.IPropertyDescriptor> GetProperties(System.Type type, object container)
    {
        var properties = new System.Collections.Generic.List<YamlDotNet.Serialization.IPropertyDescriptor>();
        for (var current = type; current != null; current = current.BaseType)
        {
            string propertyName;
            string value;
            if (DiscriminatorTypeRegistry.TryGetDiscriminator(current, out propertyName, out value))
            {
                properties.Insert(0, new DiscriminatorPropertyDescriptor(propertyName, value));
            }
        }
        properties.AddRange(inner.GetProperties(type, container));
        return properties;
    }
}
"#;
