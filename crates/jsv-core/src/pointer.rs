//! RFC 6901 JSON pointers.
//!
//! Pointers address locations inside a JSON document. They name schema
//! locations, violation paths, and `$ref` fragments, so parsing and
//! rendering live here rather than in the schema crate.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::{Error, Result};

/// A parsed RFC 6901 JSON pointer.
///
/// The empty pointer addresses the whole document. Segments are stored
/// unescaped; `~0` and `~1` are decoded at parse time and encoded again on
/// display, so `to_string` round-trips the canonical text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    segments: Vec<String>,
}

impl JsonPointer {
    /// The root pointer addressing the whole document.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse pointer text.
    ///
    /// The empty string is the root pointer. Any other text must begin with
    /// `/`, and only the `~0` and `~1` escapes are accepted.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = text.strip_prefix('/') else {
            return Err(Error::invalid_pointer(text, "must start with '/'"));
        };
        let mut segments = Vec::new();
        for raw in rest.split('/') {
            let segment =
                unescape(raw).map_err(|reason| Error::invalid_pointer(text, reason))?;
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    /// Unescaped segments in document order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments; zero for the root pointer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True for the root pointer.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, if any.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Pointer to the parent location, or `None` for the root pointer.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut segments = self.segments.clone();
        segments.pop();
        Some(Self { segments })
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    /// Remove and return the last segment, if any.
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    /// New pointer extended with an object-member segment.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// New pointer extended with an array-index segment.
    #[must_use]
    pub fn child_index(&self, index: usize) -> Self {
        self.child(index.to_string())
    }

    /// New pointer with another pointer's segments appended.
    #[must_use]
    pub fn concat(&self, tail: &Self) -> Self {
        let mut segments = self.segments.clone();
        segments.extend_from_slice(&tail.segments);
        Self { segments }
    }

    /// Resolve the pointer against a JSON document.
    ///
    /// Object segments select members by exact name. Array segments must be
    /// canonical base-10 indexes, so leading zeros and the `-` end marker do
    /// not resolve.
    #[must_use]
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for segment in &self.segments {
            match current {
                Value::Object(members) => current = members.get(segment)?,
                Value::Array(items) => current = items.get(array_index(segment)?)?,
                _ => return None,
            }
        }
        Some(current)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", escape(segment))?;
        }
        Ok(())
    }
}

impl FromStr for JsonPointer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse an array-index segment under RFC 6901 rules.
fn array_index(segment: &str) -> Option<usize> {
    if segment == "0" {
        return Some(0);
    }
    if segment.is_empty() || segment.starts_with('0') {
        return None;
    }
    if !segment.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn unescape(raw: &str) -> std::result::Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            Some(other) => return Err(format!("invalid escape '~{other}'")),
            None => return Err("dangling '~' escape".to_string()),
        }
    }
    Ok(out)
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_root_pointer() {
        let pointer = JsonPointer::parse("").unwrap();
        assert!(pointer.is_empty());
        assert_eq!(pointer.to_string(), "");
    }

    #[test]
    fn parses_escaped_segments() {
        let pointer = JsonPointer::parse("/a~1b/c~0d").unwrap();
        assert_eq!(pointer.segments(), ["a/b", "c~d"]);
        assert_eq!(pointer.to_string(), "/a~1b/c~0d");
    }

    #[test]
    fn rejects_missing_leading_slash() {
        let error = JsonPointer::parse("a/b").unwrap_err();
        assert!(matches!(error, Error::InvalidPointer { .. }));
    }

    #[test]
    fn rejects_unknown_escapes() {
        assert!(JsonPointer::parse("/a~2b").is_err());
        assert!(JsonPointer::parse("/a~").is_err());
    }

    #[test]
    fn resolves_object_and_array_paths() {
        let document = json!({"items": [{"name": "first"}, {"name": "second"}]});
        let pointer = JsonPointer::parse("/items/1/name").unwrap();
        assert_eq!(pointer.resolve(&document), Some(&json!("second")));
    }

    #[test]
    fn resolves_empty_member_name() {
        let document = json!({"": 7});
        let pointer = JsonPointer::parse("/").unwrap();
        assert_eq!(pointer.resolve(&document), Some(&json!(7)));
    }

    #[test]
    fn rejects_non_canonical_array_indexes() {
        let document = json!([10, 20, 30]);
        assert_eq!(JsonPointer::parse("/01").unwrap().resolve(&document), None);
        assert_eq!(JsonPointer::parse("/-").unwrap().resolve(&document), None);
        assert_eq!(
            JsonPointer::parse("/1").unwrap().resolve(&document),
            Some(&json!(20))
        );
    }

    #[test]
    fn builds_child_paths() {
        let pointer = JsonPointer::root().child("properties").child("a");
        assert_eq!(pointer.to_string(), "/properties/a");
        assert_eq!(pointer.parent().unwrap().to_string(), "/properties");
        assert_eq!(pointer.child_index(3).to_string(), "/properties/a/3");
    }

    #[test]
    fn concat_appends_segments() {
        let base = JsonPointer::parse("/definitions/leaf").unwrap();
        let tail = JsonPointer::parse("/properties/x").unwrap();
        assert_eq!(
            base.concat(&tail).to_string(),
            "/definitions/leaf/properties/x"
        );
        assert_eq!(base.concat(&JsonPointer::root()), base);
        assert_eq!(JsonPointer::root().concat(&tail), tail);
    }

    #[test]
    fn push_and_pop_mutate_in_place() {
        let mut pointer = JsonPointer::root();
        pointer.push("definitions");
        pointer.push("node");
        assert_eq!(pointer.last(), Some("node"));
        assert_eq!(pointer.pop(), Some("node".to_string()));
        assert_eq!(pointer.to_string(), "/definitions");
    }
}
