//! Schema acquisition
//!
//! The root document comes from a file, an http(s) URL, or standard input.
//! Documents it references through `$ref` are fetched breadth-first until
//! the [`DocumentSet`] is closed.

use sgen_core::{SgenError, SgenResult};
use sgen_schema::{DocumentFormat, DocumentSet, default_base_url, parse_document};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use url::Url;

/// Run aborted by Ctrl-C
#[derive(Debug, thiserror::Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Location of the root schema document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Stdin,
    File(PathBuf),
    Url(Url),
}

impl SchemaSource {
    /// Classify a `--schema` value; `None` and `-` mean standard input
    pub fn parse(location: Option<&str>) -> SgenResult<Self> {
        match location {
            None | Some("-") => Ok(SchemaSource::Stdin),
            Some(location)
                if location.starts_with("http://") || location.starts_with("https://") =>
            {
                Url::parse(location)
                    .map(SchemaSource::Url)
                    .map_err(|e| SgenError::SchemaLoad(format!("invalid URL {location}: {e}")))
            }
            Some(path) => Ok(SchemaSource::File(PathBuf::from(path))),
        }
    }

    /// Absolute URL that relative references are resolved against
    pub fn base_url(&self) -> SgenResult<Url> {
        match self {
            SchemaSource::Stdin => Ok(std::env::current_dir()
                .ok()
                .and_then(|dir| Url::from_directory_path(dir).ok())
                .and_then(|dir| dir.join("stdin").ok())
                .unwrap_or_else(default_base_url)),
            SchemaSource::File(path) => {
                let absolute = std::path::absolute(path)?;
                Url::from_file_path(&absolute).map_err(|()| {
                    SgenError::SchemaLoad(format!("invalid schema path {}", absolute.display()))
                })
            }
            SchemaSource::Url(url) => Ok(url.clone()),
        }
    }
}

/// Reads documents from disk, the network, or standard input
pub struct Fetcher {
    client: reqwest::Client,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Read the root document and every document it references
    pub async fn acquire(&self, source: &SchemaSource) -> SgenResult<DocumentSet> {
        let root = source.base_url()?;
        let text = match source {
            SchemaSource::Stdin => read_stdin().await?,
            _ => self.read(&root).await?,
        };
        let format = match source {
            SchemaSource::Stdin => DocumentFormat::Detect,
            _ => DocumentFormat::from_path(root.path()),
        };
        let mut documents = DocumentSet::new(root, parse_document(&text, format)?);

        loop {
            let missing = documents.missing_documents();
            if missing.is_empty() {
                break;
            }
            debug!(count = missing.len(), "fetching referenced documents");
            for url in missing {
                let text = self.read(&url).await?;
                let document = parse_document(&text, DocumentFormat::from_path(url.path()))?;
                documents.insert(url, document);
            }
        }
        info!(documents = documents.len(), "schema documents loaded");
        Ok(documents)
    }

    async fn read(&self, url: &Url) -> SgenResult<String> {
        debug!(%url, "reading document");
        match url.scheme() {
            "file" => {
                let path = url.to_file_path().map_err(|()| {
                    SgenError::SchemaLoad(format!("invalid file URL {url}"))
                })?;
                tokio::fs::read_to_string(&path).await.map_err(|e| {
                    SgenError::SchemaLoad(format!("failed to read {}: {e}", path.display()))
                })
            }
            "http" | "https" => self.fetch(url).await,
            scheme => Err(SgenError::SchemaLoad(format!(
                "unsupported scheme '{scheme}' in {url}"
            ))),
        }
    }

    async fn fetch(&self, url: &Url) -> SgenResult<String> {
        let failed = |e: reqwest::Error| SgenError::SchemaLoad(format!("failed to fetch {url}: {e}"));
        self.client
            .get(url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(failed)?
            .text()
            .await
            .map_err(failed)
    }
}

async fn read_stdin() -> SgenResult<String> {
    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .map_err(|e| SgenError::SchemaLoad(format!("failed to read standard input: {e}")))?;
    Ok(text)
}
