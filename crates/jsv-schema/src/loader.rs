//! Schema loader with transitive reference resolution
//!
//! Loading parses and compiles the root document, then drains a worklist of
//! collected reference targets in first-encountered order. Each target's
//! document is fetched through the configured [`DocumentFetcher`] (with an
//! optional shared cache) and its fragment is checked to resolve, so by the
//! time `load` returns every reference reachable from the root is known to
//! dereference. Cyclic references terminate because each document loads and
//! each target verifies at most once.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use jsv_core::JsonPointer;
use serde_json::Value;
use tracing::{debug, info, trace};
use url::Url;

use crate::compile::{self, CompiledSchema};
use crate::fetcher::{DenyAllFetcher, DocumentFetcher, FetchError};
use crate::registry::DocumentCache;
use crate::resolver::{
    AnchorTarget, DocumentEntry, DocumentSet, Schema, anchored_location, fragment_pointer,
    split_target,
};
use crate::{LoadError, ResolutionError, Result};

/// Cooperative cancellation handle for long loads
///
/// Cloned tokens share state; cancelling any clone stops the load at the
/// next reference boundary with [`LoadError::Cancelled`].
#[derive(Debug, Clone, Default)]
pub struct LoadToken {
    cancelled: Arc<AtomicBool>,
}

impl LoadToken {
    /// Create an active token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// True once cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Configuration for schema loading
#[derive(Clone)]
pub struct LoaderOptions {
    resolution_scope: Option<String>,
    fetcher: Arc<dyn DocumentFetcher>,
    cache: Option<Arc<DocumentCache>>,
    cancellation: Option<LoadToken>,
}

impl LoaderOptions {
    /// Default options: no resolution scope, no cache, and a fetcher that
    /// refuses every remote document.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolution_scope: None,
            fetcher: Arc::new(DenyAllFetcher),
            cache: None,
            cancellation: None,
        }
    }

    /// Set the base URI relative references resolve against.
    #[must_use]
    pub fn with_resolution_scope(mut self, scope: impl Into<String>) -> Self {
        self.resolution_scope = Some(scope.into());
        self
    }

    /// Set the transport for referenced documents.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Share a document cache across loads.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<DocumentCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: LoadToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Configured resolution scope, if any.
    #[must_use]
    pub fn resolution_scope(&self) -> Option<&str> {
        self.resolution_scope.as_deref()
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LoaderOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderOptions")
            .field("resolution_scope", &self.resolution_scope)
            .field("cache", &self.cache.is_some())
            .field("cancellation", &self.cancellation.is_some())
            .finish_non_exhaustive()
    }
}

/// Schema loader
pub struct SchemaLoader {
    options: LoaderOptions,
}

impl SchemaLoader {
    /// Create a loader with default options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            options: LoaderOptions::new(),
        }
    }

    /// Create a loader with the given options.
    #[must_use]
    pub fn with_options(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Configured options.
    #[must_use]
    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Load a schema from an already parsed document.
    pub fn load_value(&self, raw: &Value) -> Result<Schema> {
        Load::run(&self.options, raw)
    }

    /// Load a schema from JSON text.
    pub fn load_str(&self, text: &str) -> Result<Schema> {
        let raw: Value = serde_json::from_str(text).map_err(|error| LoadError::Parse {
            uri: self.input_label(),
            reason: error.to_string(),
        })?;
        self.load_value(&raw)
    }

    /// Load a schema from YAML text.
    pub fn load_yaml_str(&self, text: &str) -> Result<Schema> {
        let raw: Value = serde_yaml::from_str(text).map_err(|error| LoadError::Parse {
            uri: self.input_label(),
            reason: error.to_string(),
        })?;
        self.load_value(&raw)
    }

    /// Load a schema from a file, picking the parser by extension.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<Schema> {
        let path = path.as_ref();
        info!("Loading schema from file: {:?}", path);
        let text = std::fs::read_to_string(path)?;
        let label = path.display().to_string();
        let raw: Value = if is_yaml_path(path) {
            serde_yaml::from_str(&text).map_err(|error| LoadError::Parse {
                uri: label,
                reason: error.to_string(),
            })?
        } else {
            serde_json::from_str(&text).map_err(|error| LoadError::Parse {
                uri: label,
                reason: error.to_string(),
            })?
        };
        self.load_value(&raw)
    }

    fn input_label(&self) -> String {
        self.options
            .resolution_scope()
            .unwrap_or("<input>")
            .to_string()
    }
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load a schema with explicit options.
pub fn load_schema(raw: &Value, options: LoaderOptions) -> Result<Schema> {
    SchemaLoader::with_options(options).load_value(raw)
}

/// State of one load: documents and anchors gathered so far, plus the
/// worklist of reference targets still to verify.
struct Load<'a> {
    options: &'a LoaderOptions,
    documents: HashMap<String, DocumentEntry>,
    anchors: HashMap<String, AnchorTarget>,
    worklist: VecDeque<String>,
    verified: HashSet<String>,
}

impl<'a> Load<'a> {
    fn run(options: &'a LoaderOptions, raw: &Value) -> Result<Schema> {
        let scope = parse_scope(options.resolution_scope())?;
        let root_uri = scope
            .as_ref()
            .map(Url::to_string)
            .unwrap_or_default();

        let mut load = Load {
            options,
            documents: HashMap::new(),
            anchors: HashMap::new(),
            worklist: VecDeque::new(),
            verified: HashSet::new(),
        };
        load.check_cancelled()?;
        load.insert_document(root_uri.clone(), raw.clone(), scope.as_ref())?;
        load.drain()?;
        load.finalize(&root_uri)
    }

    fn insert_document(&mut self, uri: String, raw: Value, scope: Option<&Url>) -> Result<()> {
        debug!("Compiling document: '{}'", uri);
        let compiled = compile::compile_document(&raw, scope)?;
        self.register(uri, raw, compiled);
        Ok(())
    }

    fn register(&mut self, uri: String, raw: Value, compiled: CompiledSchema) {
        for (anchor, pointer) in compiled.anchors {
            self.anchors.entry(anchor).or_insert(AnchorTarget {
                document: uri.clone(),
                pointer,
            });
        }
        self.worklist.extend(compiled.references);
        let entry = DocumentEntry::new(uri.clone(), raw, compiled.node);
        self.documents.insert(uri, entry);
    }

    fn drain(&mut self) -> Result<()> {
        while let Some(target) = self.worklist.pop_front() {
            if !self.verified.insert(target.clone()) {
                continue;
            }
            self.check_cancelled()?;
            self.resolve_target(&target)?;
        }
        Ok(())
    }

    fn resolve_target(&mut self, target: &str) -> Result<()> {
        trace!("Verifying reference target: '{}'", target);
        if let Some((document, pointer)) = self.anchored(target)? {
            return self.verify_location(&document, &pointer);
        }

        let (document_uri, fragment) = split_target(target);
        let document_uri = document_uri.to_string();
        let fragment = fragment.map(str::to_string);

        if !self.documents.contains_key(&document_uri) {
            self.load_referenced_document(&document_uri)?;
            // The fetched document may have declared the target itself.
            if let Some((document, pointer)) = self.anchored(target)? {
                return self.verify_location(&document, &pointer);
            }
        }

        let pointer = fragment_pointer(target, fragment.as_deref())?;
        self.verify_location(&document_uri, &pointer)
    }

    /// Map a target onto its document and pointer through the anchor
    /// index, covering both exact identifier matches and fragments beneath
    /// a declared identifier.
    fn anchored(&self, target: &str) -> Result<Option<(String, JsonPointer)>> {
        let anchored = anchored_location(&self.anchors, target)?;
        Ok(anchored.map(|(document, pointer)| (document.to_string(), pointer)))
    }

    /// Check that a document location resolves, compiling the raw location
    /// as an auxiliary target when the keyword tree cannot reach it.
    fn verify_location(&mut self, document_uri: &str, pointer: &JsonPointer) -> Result<()> {
        let Some(entry) = self.documents.get(document_uri) else {
            return Err(ResolutionError::DocumentNotFound {
                uri: document_uri.to_string(),
            }
            .into());
        };
        if pointer.is_empty() || entry.node_at(pointer).is_some() {
            return Ok(());
        }
        self.compile_auxiliary(document_uri, pointer)
    }

    fn load_referenced_document(&mut self, uri: &str) -> Result<()> {
        self.check_cancelled()?;
        let raw = self.fetch_document(uri)?;
        let scope = Url::parse(uri).ok();
        self.insert_document(uri.to_string(), raw, scope.as_ref())
    }

    fn fetch_document(&self, uri: &str) -> Result<Value> {
        if let Some(cache) = &self.options.cache {
            if let Some(cached) = cache.get(uri) {
                debug!("Cache hit for document: '{}'", uri);
                return Ok(cached.as_ref().clone());
            }
        }
        trace!("Fetching document: '{}'", uri);
        let bytes = self.options.fetcher.fetch(uri).map_err(|error| match error {
            FetchError::NotFound => LoadError::Resolution(ResolutionError::DocumentNotFound {
                uri: uri.to_string(),
            }),
            FetchError::Other(reason) => LoadError::Fetch {
                uri: uri.to_string(),
                reason,
            },
        })?;
        let raw = parse_document(uri, &bytes)?;
        if let Some(cache) = &self.options.cache {
            cache.insert(uri, Arc::new(raw.clone()));
        }
        Ok(raw)
    }

    /// Compile the raw location a reference addresses outside the keyword
    /// tree and record it as an auxiliary target of its document.
    fn compile_auxiliary(&mut self, document_uri: &str, pointer: &JsonPointer) -> Result<()> {
        let scope = Url::parse(document_uri).ok();
        let Some(entry) = self.documents.get(document_uri) else {
            return Err(ResolutionError::DocumentNotFound {
                uri: document_uri.to_string(),
            }
            .into());
        };
        let compiled = compile::compile_fragment(entry.raw(), pointer, scope.as_ref())?
            .ok_or_else(|| ResolutionError::PointerNotFound {
                uri: document_uri.to_string(),
                pointer: pointer.to_string(),
            })?;
        trace!(
            "Compiled auxiliary target '{}' in document '{}'",
            pointer,
            document_uri
        );
        for (anchor, anchor_pointer) in compiled.anchors {
            self.anchors.entry(anchor).or_insert(AnchorTarget {
                document: document_uri.to_string(),
                pointer: anchor_pointer,
            });
        }
        self.worklist.extend(compiled.references);
        if let Some(entry) = self.documents.get_mut(document_uri) {
            entry.insert_target(pointer.to_string(), compiled.node);
        }
        Ok(())
    }

    fn check_cancelled(&self) -> Result<()> {
        match &self.options.cancellation {
            Some(token) if token.is_cancelled() => Err(LoadError::Cancelled),
            _ => Ok(()),
        }
    }

    fn finalize(mut self, root_uri: &str) -> Result<Schema> {
        info!(
            "Schema load complete: {} document(s), {} reference target(s)",
            self.documents.len(),
            self.verified.len()
        );
        let root = self
            .documents
            .remove(root_uri)
            .map(Arc::new)
            .ok_or_else(|| ResolutionError::DocumentNotFound {
                uri: root_uri.to_string(),
            })?;
        let mut documents: HashMap<String, Arc<DocumentEntry>> = self
            .documents
            .into_iter()
            .map(|(uri, entry)| (uri, Arc::new(entry)))
            .collect();
        documents.insert(root_uri.to_string(), Arc::clone(&root));
        let set = Arc::new(DocumentSet::new(documents, self.anchors));
        Ok(Schema::new(set, root))
    }
}

fn parse_scope(scope: Option<&str>) -> Result<Option<Url>> {
    let Some(text) = scope else {
        return Ok(None);
    };
    Url::parse(text).map(Some).map_err(|error| {
        LoadError::Resolution(ResolutionError::MalformedReference {
            reference: text.to_string(),
            reason: format!("invalid resolution scope: {error}"),
        })
    })
}

fn parse_document(uri: &str, bytes: &[u8]) -> Result<Value> {
    if is_yaml_uri(uri) {
        serde_yaml::from_slice(bytes).map_err(|error| LoadError::Parse {
            uri: uri.to_string(),
            reason: error.to_string(),
        })
    } else {
        serde_json::from_slice(bytes).map_err(|error| LoadError::Parse {
            uri: uri.to_string(),
            reason: error.to_string(),
        })
    }
}

fn is_yaml_uri(uri: &str) -> bool {
    let path = uri.split(['#', '?']).next().unwrap_or(uri);
    path.ends_with(".yaml") || path.ends_with(".yml")
}

fn is_yaml_path(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            extension.eq_ignore_ascii_case("yaml") || extension.eq_ignore_ascii_case("yml")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn loads_a_self_contained_schema() {
        let loader = SchemaLoader::new();
        let schema = loader
            .load_value(&json!({
                "type": "object",
                "properties": {"a": {"$ref": "#/definitions/count"}},
                "definitions": {"count": {"type": "integer"}}
            }))
            .unwrap();
        assert_eq!(schema.root_uri(), "");
        assert_eq!(schema.documents().document_count(), 1);
    }

    #[test]
    fn loads_schemas_declaring_their_own_identifier() {
        let loader = SchemaLoader::new();
        let schema = loader
            .load_value(&json!({
                "$id": "http://example.com/root.json",
                "properties": {"a": {"$ref": "#/definitions/count"}},
                "definitions": {"count": {"type": "integer"}}
            }))
            .unwrap();
        assert_eq!(schema.documents().document_count(), 1);
    }

    #[test]
    fn reports_unresolved_internal_pointers() {
        let loader = SchemaLoader::new();
        let error = loader
            .load_value(&json!({"$ref": "#/definitions/missing"}))
            .unwrap_err();
        assert!(matches!(
            error,
            LoadError::Resolution(ResolutionError::PointerNotFound { .. })
        ));
    }

    #[test]
    fn refuses_remote_documents_by_default() {
        let loader = SchemaLoader::with_options(
            LoaderOptions::new().with_resolution_scope("mem://schemas/root.json"),
        );
        let error = loader
            .load_value(&json!({"$ref": "other.json"}))
            .unwrap_err();
        assert!(matches!(
            error,
            LoadError::Resolution(ResolutionError::DocumentNotFound { .. })
        ));
    }

    #[test]
    fn load_str_reports_parse_failures() {
        let loader = SchemaLoader::new();
        let error = loader.load_str("{not json").unwrap_err();
        assert!(matches!(error, LoadError::Parse { .. }));
    }

    #[test]
    fn load_yaml_str_accepts_yaml_documents() {
        let loader = SchemaLoader::new();
        let schema = loader
            .load_yaml_str("type: object\nrequired:\n  - a\n")
            .unwrap();
        assert!(schema.root().as_object().is_some());
    }

    #[test]
    fn cancelled_token_stops_the_load() {
        let token = LoadToken::new();
        token.cancel();
        let loader = SchemaLoader::with_options(LoaderOptions::new().with_cancellation(token));
        let error = loader.load_value(&json!({"type": "object"})).unwrap_err();
        assert!(matches!(error, LoadError::Cancelled));
    }

    #[test]
    fn yaml_extension_detection_covers_both_spellings() {
        assert!(is_yaml_uri("mem://schemas/a.yaml"));
        assert!(is_yaml_uri("mem://schemas/a.yml#/definitions/x"));
        assert!(!is_yaml_uri("mem://schemas/a.json"));
    }
}
