//! # jsv-schema
//!
//! Schema model, reference resolver, and document loader for JSON Schema.
//!
//! This crate turns raw JSON (or YAML) schema documents into an immutable,
//! reference-verified [`Schema`]: loading follows every `$ref` through a
//! pluggable [`DocumentFetcher`], so by the time a schema is handed to the
//! validator all reachable targets are known to resolve.

mod compile;
pub mod fetcher;
pub mod loader;
pub mod model;
pub mod registry;
pub mod resolver;

pub use fetcher::{DenyAllFetcher, DirFetcher, DocumentFetcher, FetchError, InMemoryFetcher};
pub use loader::{LoadToken, LoaderOptions, SchemaLoader, load_schema};
pub use model::{
    Additional, Dependency, Items, Keyword, ObjectSchema, Pattern, Reference, SchemaForm,
    SchemaNode, TypeName, TypeSet,
};
pub use registry::DocumentCache;
pub use resolver::{DocumentEntry, DocumentSet, Schema};

use thiserror::Error;

/// Errors that can occur while resolving schema references
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Referenced document not found: {uri}")]
    DocumentNotFound { uri: String },

    #[error("Pointer '{pointer}' does not resolve in document '{uri}'")]
    PointerNotFound { uri: String, pointer: String },

    #[error("Malformed reference '{reference}': {reason}")]
    MalformedReference { reference: String, reason: String },
}

/// Errors that can occur when loading schemas
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid schema structure at '{path}': {reason}")]
    SchemaStructureInvalid { path: String, reason: String },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Failed to fetch '{uri}': {reason}")]
    Fetch { uri: String, reason: String },

    #[error("Failed to parse document '{uri}': {reason}")]
    Parse { uri: String, reason: String },

    #[error("Schema loading was cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    /// Build a structure error at a schema location.
    pub fn structure(path: &jsv_core::JsonPointer, reason: impl Into<String>) -> Self {
        Self::SchemaStructureInvalid {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;
