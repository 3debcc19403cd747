//! sgen-core - Settings, errors, and log levels shared by the sgen crates
//!
//! This crate provides the foundational types of the generator:
//! - [`GeneratorSettings`] for namespace and serializer selection
//! - [`ConfigFile`] for `sgen.toml` configuration files
//! - [`SgenError`] for error handling
//! - [`LogLevel`] for log filter selection

mod config;
mod error;

pub use config::{ConfigFile, GeneratorSettings, SerializerLibraries, SerializerLibrary};
pub use error::{SgenError, SgenResult};

use serde::{Deserialize, Serialize};

/// Log levels accepted by the configuration file and CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }

    /// Shift the level by a verbosity delta (`-v` is +1, `-q` is -1)
    pub fn adjusted(self, delta: i8) -> Self {
        const ORDER: [LogLevel; 6] = [
            LogLevel::Off,
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ];
        let current = ORDER.iter().position(|l| *l == self).unwrap_or(2) as i16;
        let index = (current + i16::from(delta)).clamp(0, ORDER.len() as i16 - 1);
        ORDER[index as usize]
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = SgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" => Ok(LogLevel::Off),
            other => Err(SgenError::Config(format!("unknown log level: {other}"))),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ConfigFile, GeneratorSettings, LogLevel, SerializerLibraries, SerializerLibrary, SgenError,
        SgenResult,
    };
}
