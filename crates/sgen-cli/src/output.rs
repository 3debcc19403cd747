//! Output file placement and writing

use sgen_core::SgenError;
use std::path::{Path, PathBuf};

/// Default output file name for a namespace
pub fn default_file_name(namespace: &str) -> String {
    format!("{namespace}.Generated.cs")
}

/// Where the generated code goes
///
/// No output means the default file in the working directory; an existing
/// directory gets the default file inside it.
pub fn output_path(output: Option<&Path>, namespace: &str) -> PathBuf {
    match output {
        None => PathBuf::from(default_file_name(namespace)),
        Some(path) if path.is_dir() => path.join(default_file_name(namespace)),
        Some(path) => path.to_path_buf(),
    }
}

/// Write `code` to `path`, creating missing parent directories
pub async fn write(path: &Path, code: &str) -> Result<(), SgenError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, code).await?;
    Ok(())
}

#[cfg(test)]
#[path = "output/output_tests.rs"]
mod output_tests;
