//! Command line arguments and their merge with the configuration file

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser, ValueEnum};
use sgen_core::{ConfigFile, GeneratorSettings, LogLevel, SerializerLibrary};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "sgen.toml";

#[derive(Parser, Debug)]
#[command(name = "sgen")]
#[command(author, version, about = "Generate C# serialization classes from a JSON Schema", long_about = None)]
pub struct Args {
    /// Schema file path or http(s) URL (default: piped standard input)
    #[arg(long, value_name = "PATH|URL")]
    pub schema: Option<String>,

    /// Namespace of the generated types
    #[arg(long, value_name = "NS")]
    pub namespace: Option<String>,

    /// Root type name (default: the schema title)
    #[arg(long, value_name = "NAME")]
    pub root: Option<String>,

    /// Output file or directory (default: <namespace>.Generated.cs)
    #[arg(short, long, value_name = "FILE|DIR")]
    pub output: Option<PathBuf>,

    /// Serializer library to annotate for (repeatable, comma-delimited)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub serializer: Vec<SerializerArg>,

    /// Emit reactive workflow operators alongside the data classes
    #[arg(long)]
    pub workflow_operators: bool,

    /// Configuration file (default: ./sgen.toml when present)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log more (repeatable)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Log less (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializerArg {
    Json,
    Yaml,
}

impl From<SerializerArg> for SerializerLibrary {
    fn from(value: SerializerArg) -> Self {
        match value {
            SerializerArg::Json => SerializerLibrary::Json,
            SerializerArg::Yaml => SerializerLibrary::Yaml,
        }
    }
}

/// Everything a run needs once flags and file are merged
#[derive(Debug, Clone)]
pub struct Options {
    pub schema: Option<String>,
    pub root: Option<String>,
    pub output: Option<PathBuf>,
    pub settings: GeneratorSettings,
    pub log_level: Option<LogLevel>,
}

impl Args {
    /// Verbosity delta from `-v`/`-q`
    pub fn verbosity(&self) -> i8 {
        let verbose = i8::try_from(self.verbose).unwrap_or(i8::MAX);
        let quiet = i8::try_from(self.quiet).unwrap_or(i8::MAX);
        verbose.saturating_sub(quiet)
    }

    /// `--schema` may only be omitted when standard input is redirected
    pub fn require_schema(&self, stdin_redirected: bool) -> Result<(), clap::Error> {
        if self.schema.is_none() && !stdin_redirected {
            return Err(Args::command().error(
                ErrorKind::MissingRequiredArgument,
                "--schema is required unless the schema is piped to standard input",
            ));
        }
        Ok(())
    }

    /// Load the configuration file named by `--config`, or `sgen.toml` in
    /// the working directory when it exists
    pub fn load_config(&self) -> anyhow::Result<ConfigFile> {
        match &self.config {
            Some(path) => ConfigFile::load(path)
                .with_context(|| format!("failed to load config {}", path.display())),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                ConfigFile::load(Path::new(DEFAULT_CONFIG_FILE))
                    .with_context(|| format!("failed to load config {DEFAULT_CONFIG_FILE}"))
            }
            None => Ok(ConfigFile::default()),
        }
    }

    /// Overlay the flags onto the configuration file
    pub fn merge(self, config: ConfigFile) -> anyhow::Result<Options> {
        let mut settings = config.generator;
        if let Some(namespace) = self.namespace {
            settings.namespace = namespace;
        }
        if !self.serializer.is_empty() {
            settings.serializers = self
                .serializer
                .iter()
                .map(|arg| SerializerLibrary::from(*arg))
                .collect();
        }
        if self.workflow_operators {
            settings.workflow_operators = true;
        }
        settings.validate()?;
        debug!(
            namespace = %settings.namespace,
            serializers = ?settings.serializers,
            "merged settings"
        );

        Ok(Options {
            schema: self.schema,
            root: self.root.or(config.root),
            output: self.output.or(config.output),
            settings,
            log_level: config.log_level,
        })
    }
}
