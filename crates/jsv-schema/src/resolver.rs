//! Document set and reference resolution
//!
//! A loaded schema owns every document reachable from its root. References
//! are resolved against this set lazily during validation: first through
//! the anchor index built from identifier declarations, then by splitting
//! the target into a document URI and a pointer fragment.

use std::collections::HashMap;
use std::sync::Arc;

use jsv_core::JsonPointer;
use serde_json::Value;

use crate::ResolutionError;
use crate::model::{Reference, SchemaNode};

/// One loaded document with its compiled keyword tree
#[derive(Debug)]
pub struct DocumentEntry {
    uri: String,
    raw: Value,
    root: SchemaNode,
    /// Compiled nodes for raw locations outside the keyword tree, keyed by
    /// canonical pointer text.
    targets: HashMap<String, SchemaNode>,
}

impl DocumentEntry {
    pub(crate) fn new(uri: String, raw: Value, root: SchemaNode) -> Self {
        Self {
            uri,
            raw,
            root,
            targets: HashMap::new(),
        }
    }

    /// URI this document was loaded under; empty for the anonymous root.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Raw document as fetched, before compilation.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Compiled root node of this document.
    #[must_use]
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// Node at a document-relative pointer.
    ///
    /// The keyword tree is consulted first so references into `properties`
    /// and friends share the canonical compiled nodes; auxiliary targets
    /// cover raw locations the tree cannot reach, including descents into
    /// an already compiled auxiliary subtree.
    #[must_use]
    pub fn node_at(&self, pointer: &JsonPointer) -> Option<&SchemaNode> {
        if pointer.is_empty() {
            return Some(&self.root);
        }
        if let Some(node) = self.root.descend(pointer) {
            return Some(node);
        }
        let text = pointer.to_string();
        if let Some(node) = self.targets.get(&text) {
            return Some(node);
        }
        for (prefix, node) in &self.targets {
            let Some(rest) = text.strip_prefix(prefix.as_str()) else {
                continue;
            };
            if !rest.starts_with('/') {
                continue;
            }
            let Ok(rest_pointer) = JsonPointer::parse(rest) else {
                continue;
            };
            if let Some(found) = node.descend(&rest_pointer) {
                return Some(found);
            }
        }
        None
    }

    pub(crate) fn insert_target(&mut self, pointer_text: String, node: SchemaNode) {
        self.targets.insert(pointer_text, node);
    }
}

/// Where an identifier anchor points
#[derive(Debug, Clone)]
pub(crate) struct AnchorTarget {
    pub document: String,
    pub pointer: JsonPointer,
}

/// All documents reachable from a loaded schema
#[derive(Debug, Default)]
pub struct DocumentSet {
    documents: HashMap<String, Arc<DocumentEntry>>,
    anchors: HashMap<String, AnchorTarget>,
}

impl DocumentSet {
    pub(crate) fn new(
        documents: HashMap<String, Arc<DocumentEntry>>,
        anchors: HashMap<String, AnchorTarget>,
    ) -> Self {
        Self { documents, anchors }
    }

    /// Document entry for an absolute URI.
    #[must_use]
    pub fn entry(&self, uri: &str) -> Option<&Arc<DocumentEntry>> {
        self.documents.get(uri)
    }

    /// True when a document was loaded under this URI.
    #[must_use]
    pub fn contains_document(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    /// Number of loaded documents, the root included.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Loaded document URIs in sorted order.
    #[must_use]
    pub fn document_uris(&self) -> Vec<&str> {
        let mut uris: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        uris.sort_unstable();
        uris
    }

    /// Dereference a schema link.
    ///
    /// Loading verified every collected reference, so failures here mean the
    /// set and the reference went out of sync.
    pub fn resolve(&self, reference: &Reference) -> Result<&SchemaNode, ResolutionError> {
        self.resolve_uri(&reference.target)
    }

    /// Resolve an absolute target URI to its schema node.
    pub fn resolve_uri(&self, target: &str) -> Result<&SchemaNode, ResolutionError> {
        if let Some((document, pointer)) = anchored_location(&self.anchors, target)? {
            return self.node_in(document, &pointer);
        }
        let (document_uri, fragment) = split_target(target);
        if !self.documents.contains_key(document_uri) {
            return Err(ResolutionError::DocumentNotFound {
                uri: document_uri.to_string(),
            });
        }
        let pointer = fragment_pointer(target, fragment)?;
        self.node_in(document_uri, &pointer)
    }

    fn node_in(
        &self,
        document_uri: &str,
        pointer: &JsonPointer,
    ) -> Result<&SchemaNode, ResolutionError> {
        let entry =
            self.documents
                .get(document_uri)
                .ok_or_else(|| ResolutionError::DocumentNotFound {
                    uri: document_uri.to_string(),
                })?;
        entry
            .node_at(pointer)
            .ok_or_else(|| ResolutionError::PointerNotFound {
                uri: document_uri.to_string(),
                pointer: pointer.to_string(),
            })
    }
}

/// A fully loaded, reference-verified schema ready for validation
#[derive(Debug, Clone)]
pub struct Schema {
    set: Arc<DocumentSet>,
    root: Arc<DocumentEntry>,
}

impl Schema {
    pub(crate) fn new(set: Arc<DocumentSet>, root: Arc<DocumentEntry>) -> Self {
        Self { set, root }
    }

    /// Root node validation starts from.
    #[must_use]
    pub fn root(&self) -> &SchemaNode {
        self.root.root()
    }

    /// URI the root document was loaded under; empty for anonymous roots.
    #[must_use]
    pub fn root_uri(&self) -> &str {
        self.root.uri()
    }

    /// Every document reachable from the root.
    #[must_use]
    pub fn documents(&self) -> &DocumentSet {
        &self.set
    }
}

/// Split an absolute target into document URI and optional fragment.
pub(crate) fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('#') {
        Some((document, fragment)) => (document, Some(fragment)),
        None => (target, None),
    }
}

/// Map a target onto its document and pointer through the anchor index.
///
/// The whole target may name an anchor directly. Failing that, a fragment
/// target whose document part names an anchor resolves beneath the anchor's
/// location, so references into a subschema that declared its own
/// identifier stay within the declaring document instead of triggering a
/// fetch.
pub(crate) fn anchored_location<'a>(
    anchors: &'a HashMap<String, AnchorTarget>,
    target: &str,
) -> Result<Option<(&'a str, JsonPointer)>, ResolutionError> {
    if let Some(anchor) = anchors.get(target) {
        return Ok(Some((anchor.document.as_str(), anchor.pointer.clone())));
    }
    let (document_part, fragment) = split_target(target);
    let Some(fragment) = fragment else {
        return Ok(None);
    };
    let Some(anchor) = anchors.get(document_part) else {
        return Ok(None);
    };
    let relative = fragment_pointer(target, Some(fragment))?;
    Ok(Some((
        anchor.document.as_str(),
        anchor.pointer.concat(&relative),
    )))
}

/// Parse a target's fragment as a JSON pointer, percent-decoding first.
///
/// A missing or empty fragment addresses the document root.
pub(crate) fn fragment_pointer(
    reference: &str,
    fragment: Option<&str>,
) -> Result<JsonPointer, ResolutionError> {
    let Some(fragment) = fragment else {
        return Ok(JsonPointer::root());
    };
    if fragment.is_empty() {
        return Ok(JsonPointer::root());
    }
    let decoded = percent_decode(fragment);
    JsonPointer::parse(&decoded).map_err(|error| ResolutionError::MalformedReference {
        reference: reference.to_string(),
        reason: error.to_string(),
    })
}

/// Decode percent escapes, leaving malformed sequences untouched.
pub(crate) fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' && index + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex_value(bytes[index + 1]), hex_value(bytes[index + 2]))
            {
                out.push(high * 16 + low);
                index += 3;
                continue;
            }
        }
        out.push(bytes[index]);
        index += 1;
    }
    String::from_utf8(out).unwrap_or_else(|_| text.to_string())
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
