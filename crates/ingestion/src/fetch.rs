//! Sample stream transports
//!
//! - `FileSampleFetcher`: local path or `file://` reference
//! - `MemorySampleFetcher`: preloaded texts keyed by reference (tests, replay)

use std::collections::HashMap;
use std::path::Path;

use contracts::{ContractError, SampleFetcher};
use tracing::{debug, instrument};

const FILE_SCHEME: &str = "file://";

/// Reads sample text from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSampleFetcher;

impl FileSampleFetcher {
    fn resolve(source: &str) -> Result<&Path, ContractError> {
        let trimmed = source.trim();
        if let Some(path) = trimmed.strip_prefix(FILE_SCHEME) {
            return Ok(Path::new(path));
        }
        match trimmed.split_once("://") {
            Some((scheme, _)) => Err(ContractError::fetch(
                source,
                format!("unsupported scheme '{scheme}'"),
            )),
            None => Ok(Path::new(trimmed)),
        }
    }
}

impl SampleFetcher for FileSampleFetcher {
    #[instrument(name = "sample_fetch_file", skip(self))]
    async fn fetch(&self, source: &str) -> Result<String, ContractError> {
        let path = Self::resolve(source)?;
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ContractError::fetch(source, e.to_string()))?;
        debug!(bytes = text.len(), "sample text fetched");
        Ok(text)
    }
}

/// In-memory fetcher
#[derive(Debug, Clone, Default)]
pub struct MemorySampleFetcher {
    texts: HashMap<String, String>,
}

impl MemorySampleFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `text` under `source`
    pub fn with(mut self, source: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(source, text);
        self
    }

    pub fn insert(&mut self, source: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(source.into(), text.into());
    }
}

impl SampleFetcher for MemorySampleFetcher {
    async fn fetch(&self, source: &str) -> Result<String, ContractError> {
        self.texts
            .get(source)
            .cloned()
            .ok_or_else(|| ContractError::fetch(source, "not registered"))
    }
}
