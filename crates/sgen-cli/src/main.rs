//! sgen - C# serialization classes from JSON Schema
//!
//! Reads a JSON or YAML schema from a file, an http(s) URL, or standard
//! input, and writes one C# file with Newtonsoft.Json and/or YamlDotNet
//! annotations.
//!
//! ```text
//! sgen --schema schema.json --namespace Acme.Contracts --serializer json,yaml
//! ```

use anyhow::Context;
use clap::Parser;
use sgen_codegen::{Generator, root_type_name};
use sgen_core::SgenError;
use sgen_schema::SchemaGraph;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{debug, info};

mod args;
mod input;
mod logging;
mod output;

use args::Args;
use input::{Fetcher, Interrupted, SchemaSource};

/// Exit code for a run cancelled with Ctrl-C
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(err) = args.require_schema(!std::io::stdin().is_terminal()) {
        err.exit();
    }
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let verbosity = args.verbosity();
    let config = args.load_config()?;
    logging::init(verbosity, config.log_level);
    let options = args.merge(config)?;

    let source = SchemaSource::parse(options.schema.as_deref())?;
    debug!(source = ?source, "acquiring schema");
    let fetcher = Fetcher::new();
    let documents = tokio::select! {
        documents = fetcher.acquire(&source) => documents?,
        _ = tokio::signal::ctrl_c() => return Err(Interrupted.into()),
    };

    let graph = SchemaGraph::from_documents(&documents)?;
    let root = root_type_name(&graph, options.root.as_deref())?;
    info!(root = %root, namespace = %options.settings.namespace, "generating");
    let namespace = options.settings.namespace.clone();
    let generated = Generator::new(options.settings).generate(graph, &root)?;

    let path = output::output_path(options.output.as_deref(), &namespace);
    println!("Writing schema classes to {}...", path.display());
    tokio::select! {
        written = output::write(&path, &generated.code) => {
            written.with_context(|| format!("failed to write {}", path.display()))?;
        }
        _ = tokio::signal::ctrl_c() => return Err(Interrupted.into()),
    }
    info!(
        types = generated.models.len(),
        bytes = generated.code.len(),
        "schema classes written"
    );
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    if err.chain().any(|cause| cause.is::<Interrupted>()) {
        return EXIT_INTERRUPTED;
    }
    err.chain()
        .find_map(|cause| cause.downcast_ref::<SgenError>())
        .and_then(|sgen| u8::try_from(sgen.exit_code()).ok())
        .unwrap_or(1)
}
