//! Generator settings and configuration file types

use crate::error::{SgenError, SgenResult};
use crate::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A serializer library whose annotations and helpers are emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializerLibrary {
    /// Newtonsoft.Json attributes, converters, and helpers
    #[serde(alias = "NewtonsoftJson", alias = "newtonsoft-json")]
    Json,
    /// YamlDotNet attributes, type inspectors, and helpers
    #[serde(alias = "YamlDotNet", alias = "yaml-dotnet")]
    Yaml,
}

impl std::fmt::Display for SerializerLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerializerLibrary::Json => write!(f, "json"),
            SerializerLibrary::Yaml => write!(f, "yaml"),
        }
    }
}

/// The set of enabled serializer libraries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SerializerLibrary>", into = "Vec<SerializerLibrary>")]
pub struct SerializerLibraries {
    json: bool,
    yaml: bool,
}

impl SerializerLibraries {
    /// No serializer enabled
    pub const NONE: Self = Self {
        json: false,
        yaml: false,
    };

    /// Every serializer enabled
    pub const ALL: Self = Self {
        json: true,
        yaml: true,
    };

    /// Check whether a library is enabled
    pub fn contains(&self, library: SerializerLibrary) -> bool {
        match library {
            SerializerLibrary::Json => self.json,
            SerializerLibrary::Yaml => self.yaml,
        }
    }

    /// Enable a library
    pub fn insert(&mut self, library: SerializerLibrary) {
        match library {
            SerializerLibrary::Json => self.json = true,
            SerializerLibrary::Yaml => self.yaml = true,
        }
    }

    pub fn json(&self) -> bool {
        self.json
    }

    pub fn yaml(&self) -> bool {
        self.yaml
    }

    pub fn is_empty(&self) -> bool {
        !self.json && !self.yaml
    }

    /// Enabled libraries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = SerializerLibrary> + '_ {
        [SerializerLibrary::Json, SerializerLibrary::Yaml]
            .into_iter()
            .filter(|library| self.contains(*library))
    }
}

impl Default for SerializerLibraries {
    fn default() -> Self {
        Self {
            json: false,
            yaml: true,
        }
    }
}

impl FromIterator<SerializerLibrary> for SerializerLibraries {
    fn from_iter<I: IntoIterator<Item = SerializerLibrary>>(iter: I) -> Self {
        let mut libraries = Self::NONE;
        for library in iter {
            libraries.insert(library);
        }
        libraries
    }
}

impl TryFrom<Vec<SerializerLibrary>> for SerializerLibraries {
    type Error = String;

    fn try_from(value: Vec<SerializerLibrary>) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err("at least one serializer must be selected".to_string());
        }
        Ok(value.into_iter().collect())
    }
}

impl From<SerializerLibraries> for Vec<SerializerLibrary> {
    fn from(value: SerializerLibraries) -> Self {
        value.iter().collect()
    }
}

/// Settings consumed by the code generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Namespace wrapping every generated type
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Serializer libraries whose annotations and helpers are emitted
    #[serde(default)]
    pub serializers: SerializerLibraries,

    /// Emit `Required.Always` on required members instead of `Required.Default`
    #[serde(default = "default_true")]
    pub required_properties_must_be_defined: bool,

    /// Emit reactive workflow operators: a `Generate` source on every
    /// concrete class, `Match<Base>` filters, and per-library
    /// serialize/deserialize operators
    #[serde(default)]
    pub workflow_operators: bool,

    /// Tool name stamped into the generated-code attribute
    #[serde(default = "default_generator_name")]
    pub generator_name: String,

    /// Tool version stamped into the generated-code attribute
    #[serde(default = "default_generator_version")]
    pub generator_version: String,
}

fn default_namespace() -> String {
    "DataSchema".to_string()
}

fn default_true() -> bool {
    true
}

fn default_generator_name() -> String {
    "sgen".to_string()
}

fn default_generator_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            serializers: SerializerLibraries::default(),
            required_properties_must_be_defined: true,
            workflow_operators: false,
            generator_name: default_generator_name(),
            generator_version: default_generator_version(),
        }
    }
}

impl GeneratorSettings {
    /// Settings with the given namespace and serializers, other fields default
    pub fn new(namespace: impl Into<String>, serializers: SerializerLibraries) -> Self {
        Self {
            namespace: namespace.into(),
            serializers,
            ..Self::default()
        }
    }

    /// Validate the settings
    pub fn validate(&self) -> SgenResult<()> {
        if self.namespace.is_empty() {
            return Err(SgenError::Config("namespace cannot be empty".to_string()));
        }
        if !is_dotted_identifier(&self.namespace) {
            return Err(SgenError::Config(format!(
                "namespace '{}' is not a valid dotted identifier",
                self.namespace
            )));
        }
        if self.serializers.is_empty() {
            return Err(SgenError::Config(
                "at least one serializer must be selected".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_dotted_identifier(value: &str) -> bool {
    value.split('.').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if first.is_alphabetic() || first == '_' => {
                chars.all(|c| c.is_alphanumeric() || c == '_')
            }
            _ => false,
        }
    })
}

/// Contents of an `sgen.toml` configuration file
///
/// ```toml
/// root = "Container"
/// output = "generated"
/// log_level = "debug"
///
/// [generator]
/// namespace = "Acme.Contracts"
/// serializers = ["json", "yaml"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Generator settings
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Root type name override
    #[serde(default)]
    pub root: Option<String>,

    /// Output file or directory
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Log level used when neither `RUST_LOG` nor a verbosity flag is set
    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

impl ConfigFile {
    /// Parse a configuration file from TOML text
    pub fn parse(content: &str) -> SgenResult<Self> {
        let config: ConfigFile = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and parse a configuration file
    pub fn load(path: &Path) -> SgenResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SgenError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::parse(&content)
    }

    /// Validate the configuration
    pub fn validate(&self) -> SgenResult<()> {
        if let Some(root) = &self.root
            && root.trim().is_empty()
        {
            return Err(SgenError::Config("root cannot be empty".to_string()));
        }
        self.generator.validate()
    }
}
