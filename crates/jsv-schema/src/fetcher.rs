//! Pluggable document transport
//!
//! The loader never touches the network or filesystem directly; every
//! referenced document goes through a [`DocumentFetcher`]. Implementations
//! map absolute URIs to raw bytes and parsing stays in the loader, so a
//! fetcher works the same for JSON and YAML documents.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

use crate::resolver::percent_decode;

/// Errors a fetcher can report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No document exists under the requested URI.
    #[error("document not found")]
    NotFound,

    /// Transport-level failure distinct from absence.
    #[error("{0}")]
    Other(String),
}

/// Transport for referenced schema documents
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the raw bytes of the document at an absolute URI.
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetcher backed by a fixed set of preloaded documents
///
/// The usual choice in tests and for schema bundles shipped inside a
/// binary.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFetcher {
    documents: HashMap<String, Vec<u8>>,
}

impl InMemoryFetcher {
    /// Create an empty fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
        }
    }

    /// Builder-style registration of a document.
    #[must_use]
    pub fn with_document(mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.documents.insert(uri.into(), bytes.into());
        self
    }

    /// Register a document in place.
    pub fn insert(&mut self, uri: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.documents.insert(uri.into(), bytes.into());
    }
}

impl DocumentFetcher for InMemoryFetcher {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        self.documents
            .get(uri)
            .cloned()
            .ok_or(FetchError::NotFound)
    }
}

/// Fetcher serving documents from a directory tree
///
/// The URI's host and path segments map below the configured root. Segments
/// that would escape the root are refused rather than resolved.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    /// Serve documents from the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn local_path(&self, uri: &str) -> Option<PathBuf> {
        let parsed = Url::parse(uri).ok()?;
        let mut path = self.root.clone();
        if let Some(host) = parsed.host_str() {
            if !host.is_empty() {
                path.push(host);
            }
        }
        for segment in parsed.path().split('/').filter(|segment| !segment.is_empty()) {
            let decoded = percent_decode(segment);
            if decoded == "." || decoded == ".." {
                return None;
            }
            path.push(decoded);
        }
        Some(path)
    }
}

impl DocumentFetcher for DirFetcher {
    fn fetch(&self, uri: &str) -> Result<Vec<u8>, FetchError> {
        let Some(path) = self.local_path(uri) else {
            return Err(FetchError::Other(format!("unsupported document URI '{uri}'")));
        };
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Err(FetchError::NotFound),
            Err(error) => Err(FetchError::Other(error.to_string())),
        }
    }
}

/// Default fetcher that refuses every request
///
/// Keeps loading hermetic until a transport is chosen explicitly; any
/// reference leaving the root document fails as a missing document.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenyAllFetcher;

impl DocumentFetcher for DenyAllFetcher {
    fn fetch(&self, _uri: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_fetcher_serves_registered_documents() {
        let fetcher = InMemoryFetcher::new()
            .with_document("mem://a.json", r#"{"type": "object"}"#);
        assert!(fetcher.fetch("mem://a.json").is_ok());
        assert_eq!(fetcher.fetch("mem://b.json"), Err(FetchError::NotFound));
    }

    #[test]
    fn deny_all_fetcher_refuses_everything() {
        assert_eq!(
            DenyAllFetcher.fetch("mem://a.json"),
            Err(FetchError::NotFound)
        );
    }

    #[test]
    fn dir_fetcher_maps_host_and_path_below_the_root() {
        let fetcher = DirFetcher::new("/schemas");
        let path = fetcher.local_path("res://common/address.json").unwrap();
        assert_eq!(path, PathBuf::from("/schemas/common/address.json"));
    }

    #[test]
    fn dir_fetcher_keeps_traversal_below_the_root() {
        let fetcher = DirFetcher::new("/schemas");
        let path = fetcher.local_path("mem://host/a/../../b.json").unwrap();
        assert!(path.starts_with("/schemas"));
    }

    #[test]
    fn dir_fetcher_reports_missing_files_as_not_found() {
        let fetcher = DirFetcher::new(std::env::temp_dir());
        assert_eq!(
            fetcher.fetch("mem://nope/definitely-missing.json"),
            Err(FetchError::NotFound)
        );
    }
}
