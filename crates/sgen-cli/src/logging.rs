//! Log subscriber setup
//!
//! Filter precedence, highest first: `RUST_LOG`, then `-v`/`-q`, then the
//! configured `log_level`, then `warn`. Logs go to stderr.

use sgen_core::LogLevel;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

pub const DEFAULT_LEVEL: LogLevel = LogLevel::Warn;

/// Filter directive for the given sources
pub fn directive(rust_log: Option<&str>, verbosity: i8, configured: Option<LogLevel>) -> String {
    if let Some(env) = rust_log.map(str::trim).filter(|env| !env.is_empty()) {
        return env.to_string();
    }
    let level = if verbosity != 0 {
        DEFAULT_LEVEL.adjusted(verbosity)
    } else {
        configured.unwrap_or(DEFAULT_LEVEL)
    };
    level.as_directive().to_string()
}

/// Install the global subscriber
pub fn init(verbosity: i8, configured: Option<LogLevel>) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = directive(rust_log.as_deref(), verbosity, configured);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(&directive));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}
