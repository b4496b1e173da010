//! Schema model definitions
//!
//! A loaded schema is a tree of [`SchemaNode`] values mirroring the keyword
//! structure of the source document. References stay symbolic links that are
//! dereferenced against the owning document set during validation, so cyclic
//! schemas need no special representation.

use std::fmt;

use jsv_core::{JsonKind, JsonPointer, is_integral};
use regex::Regex;
use serde_json::{Map, Number, Value};

/// One node of the schema keyword tree
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Location of this node inside its containing document
    pub location: JsonPointer,
    /// Boolean or keyword-bearing form
    pub form: SchemaForm,
}

/// The two source forms a schema can take
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaForm {
    /// `true` accepts every instance, `false` accepts none
    Boolean(bool),
    /// Object schema carrying validation keywords
    Object(ObjectSchema),
}

/// Keyword-bearing object schema
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    /// Identifier declared by `$id` (or legacy `id`) after scope resolution
    pub id: Option<String>,
    /// Human-readable title
    pub title: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
    /// Recognized keywords in document order
    pub keywords: Vec<Keyword>,
    /// Unrecognized members, kept verbatim for extension tooling
    pub extensions: Map<String, Value>,
}

/// A recognized validation keyword
#[derive(Debug, Clone, PartialEq)]
pub enum Keyword {
    /// `type`: kind restriction
    Type(TypeSet),
    /// `enum`: closed set of permitted values
    Enum(Vec<Value>),
    /// `const`: single permitted value
    Const(Value),
    /// `multipleOf`: divisibility requirement
    MultipleOf(Number),
    /// `minimum`: inclusive lower bound
    Minimum(Number),
    /// `exclusiveMinimum`: exclusive lower bound
    ExclusiveMinimum(Number),
    /// `maximum`: inclusive upper bound
    Maximum(Number),
    /// `exclusiveMaximum`: exclusive upper bound
    ExclusiveMaximum(Number),
    /// `minLength`: minimum length in Unicode code points
    MinLength(u64),
    /// `maxLength`: maximum length in Unicode code points
    MaxLength(u64),
    /// `pattern`: regex the string must contain a match of
    Pattern(Pattern),
    /// `format`: named semantic format
    Format(String),
    /// `items`: element schema or positional schemas
    Items(Items),
    /// `additionalItems`: policy for elements past the positional schemas
    AdditionalItems(Additional),
    /// `minItems`: minimum element count
    MinItems(u64),
    /// `maxItems`: maximum element count
    MaxItems(u64),
    /// `uniqueItems`: element distinctness requirement
    UniqueItems(bool),
    /// `contains`: at least one element must match
    Contains(Box<SchemaNode>),
    /// `properties`: per-member schemas in document order
    Properties(Vec<(String, SchemaNode)>),
    /// `patternProperties`: schemas for members whose names match a regex
    PatternProperties(Vec<(Pattern, SchemaNode)>),
    /// `additionalProperties`: policy for members no other keyword covers
    AdditionalProperties(Additional),
    /// `required`: member names that must be present
    Required(Vec<String>),
    /// `minProperties`: minimum member count
    MinProperties(u64),
    /// `maxProperties`: maximum member count
    MaxProperties(u64),
    /// `propertyNames`: schema every member name must satisfy
    PropertyNames(Box<SchemaNode>),
    /// `dependencies`: per-member presence or schema dependencies
    Dependencies(Vec<(String, Dependency)>),
    /// `allOf`: every subschema must match
    AllOf(Vec<SchemaNode>),
    /// `anyOf`: at least one subschema must match
    AnyOf(Vec<SchemaNode>),
    /// `oneOf`: exactly one subschema must match
    OneOf(Vec<SchemaNode>),
    /// `not`: the subschema must not match
    Not(Box<SchemaNode>),
    /// `$ref`: link to another schema location
    Ref(Reference),
    /// `definitions`: named subschemas for reuse
    Definitions(Vec<(String, SchemaNode)>),
}

/// Value of the `items` keyword
#[derive(Debug, Clone, PartialEq)]
pub enum Items {
    /// One schema applied to every element
    Uniform(Box<SchemaNode>),
    /// Positional schemas; extra elements fall to `additionalItems`
    Tuple(Vec<SchemaNode>),
}

/// Boolean-or-schema policy used by `additionalProperties` and `additionalItems`
#[derive(Debug, Clone, PartialEq)]
pub enum Additional {
    /// Boolean form: permit or forbid anything extra
    Permitted(bool),
    /// Schema form applied to each extra value
    Schema(Box<SchemaNode>),
}

/// One entry of the `dependencies` keyword
#[derive(Debug, Clone, PartialEq)]
pub enum Dependency {
    /// Presence dependency: these members must also be present
    Required(Vec<String>),
    /// Schema dependency applied to the whole object
    Schema(Box<SchemaNode>),
}

/// A `$ref` link carrying its source text and resolved absolute target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Reference text as written in the document
    pub raw: String,
    /// Absolute target URI, fragment included, after scope resolution
    pub target: String,
}

/// One name permitted by the `type` keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeName {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
}

impl TypeName {
    /// Parse a `type` keyword value.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "null" => Some(Self::Null),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "string" => Some(Self::String),
            _ => None,
        }
    }

    /// Keyword text of this name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
        }
    }

    /// True when the instance satisfies this type name.
    ///
    /// `integer` accepts any number with an integral mathematical value, so
    /// `1.0` passes.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Integer => match value {
                Value::Number(number) => is_integral(number),
                _ => false,
            },
            Self::Null => JsonKind::of(value) == JsonKind::Null,
            Self::Boolean => JsonKind::of(value) == JsonKind::Boolean,
            Self::Object => JsonKind::of(value) == JsonKind::Object,
            Self::Array => JsonKind::of(value) == JsonKind::Array,
            Self::Number => JsonKind::of(value) == JsonKind::Number,
            Self::String => JsonKind::of(value) == JsonKind::String,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the `type` keyword: a single name or a union
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSet {
    names: Vec<TypeName>,
}

impl TypeSet {
    /// Build a type set; order is preserved for messages.
    pub fn new(names: Vec<TypeName>) -> Self {
        Self { names }
    }

    /// Permitted names in document order.
    #[must_use]
    pub fn names(&self) -> &[TypeName] {
        &self.names
    }

    /// True when the instance satisfies any permitted name.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        self.names.iter().any(|name| name.matches(value))
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for name in &self.names {
            if !first {
                f.write_str(" or ")?;
            }
            first = false;
            f.write_str(name.as_str())?;
        }
        Ok(())
    }
}

/// A compiled regex paired with its source text
///
/// Matching is an unanchored search, as `pattern` and `patternProperties`
/// require. Equality compares source text so schema nodes stay comparable.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern, keeping the source text for messages.
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let regex = Regex::new(&source)?;
        Ok(Self { source, regex })
    }

    /// Source text as written in the schema.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Unanchored search for a match.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl SchemaNode {
    /// Build a boolean-form node.
    pub fn boolean(location: JsonPointer, value: bool) -> Self {
        Self {
            location,
            form: SchemaForm::Boolean(value),
        }
    }

    /// Build an object-form node.
    pub fn object(location: JsonPointer, schema: ObjectSchema) -> Self {
        Self {
            location,
            form: SchemaForm::Object(schema),
        }
    }

    /// Object schema of this node, if it has object form.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectSchema> {
        match &self.form {
            SchemaForm::Object(schema) => Some(schema),
            SchemaForm::Boolean(_) => None,
        }
    }

    /// Walk a document-relative pointer through the keyword tree.
    ///
    /// Each pointer segment must step through a subschema-bearing keyword,
    /// so `/properties/a` reaches the member schema while `/required/0` does
    /// not resolve. Locations outside the keyword tree are handled by the
    /// owning document's auxiliary targets instead.
    #[must_use]
    pub fn descend(&self, pointer: &JsonPointer) -> Option<&SchemaNode> {
        let mut current = self;
        let mut segments = pointer.segments().iter();
        while let Some(segment) = segments.next() {
            current = current.step(segment, &mut segments)?;
        }
        Some(current)
    }

    fn step<'a>(
        &'a self,
        segment: &str,
        rest: &mut std::slice::Iter<'_, String>,
    ) -> Option<&'a SchemaNode> {
        let schema = self.as_object()?;
        let keyword = schema
            .keywords
            .iter()
            .find(|keyword| keyword.name() == segment)?;
        match keyword {
            Keyword::Properties(entries) | Keyword::Definitions(entries) => {
                let key = rest.next()?;
                entries
                    .iter()
                    .find(|(name, _)| name == key)
                    .map(|(_, node)| node)
            }
            Keyword::PatternProperties(entries) => {
                let key = rest.next()?;
                entries
                    .iter()
                    .find(|(pattern, _)| pattern.source() == key)
                    .map(|(_, node)| node)
            }
            Keyword::Dependencies(entries) => {
                let key = rest.next()?;
                entries.iter().find_map(|(name, dependency)| {
                    match dependency {
                        Dependency::Schema(node) if name == key => Some(node.as_ref()),
                        _ => None,
                    }
                })
            }
            Keyword::Items(Items::Uniform(node)) => Some(node),
            Keyword::Items(Items::Tuple(nodes)) => {
                let index: usize = rest.next()?.parse().ok()?;
                nodes.get(index)
            }
            Keyword::AllOf(nodes) | Keyword::AnyOf(nodes) | Keyword::OneOf(nodes) => {
                let index: usize = rest.next()?.parse().ok()?;
                nodes.get(index)
            }
            Keyword::Not(node) | Keyword::Contains(node) | Keyword::PropertyNames(node) => {
                Some(node)
            }
            Keyword::AdditionalProperties(Additional::Schema(node))
            | Keyword::AdditionalItems(Additional::Schema(node)) => Some(node),
            _ => None,
        }
    }
}

impl ObjectSchema {
    /// First keyword with the given name, if present.
    #[must_use]
    pub fn keyword(&self, name: &str) -> Option<&Keyword> {
        self.keywords.iter().find(|keyword| keyword.name() == name)
    }

    /// The `$ref` keyword, if present.
    #[must_use]
    pub fn reference(&self) -> Option<&Reference> {
        self.keywords.iter().find_map(|keyword| match keyword {
            Keyword::Ref(reference) => Some(reference),
            _ => None,
        })
    }
}

impl Keyword {
    /// Keyword name as written in schema documents.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Type(_) => "type",
            Self::Enum(_) => "enum",
            Self::Const(_) => "const",
            Self::MultipleOf(_) => "multipleOf",
            Self::Minimum(_) => "minimum",
            Self::ExclusiveMinimum(_) => "exclusiveMinimum",
            Self::Maximum(_) => "maximum",
            Self::ExclusiveMaximum(_) => "exclusiveMaximum",
            Self::MinLength(_) => "minLength",
            Self::MaxLength(_) => "maxLength",
            Self::Pattern(_) => "pattern",
            Self::Format(_) => "format",
            Self::Items(_) => "items",
            Self::AdditionalItems(_) => "additionalItems",
            Self::MinItems(_) => "minItems",
            Self::MaxItems(_) => "maxItems",
            Self::UniqueItems(_) => "uniqueItems",
            Self::Contains(_) => "contains",
            Self::Properties(_) => "properties",
            Self::PatternProperties(_) => "patternProperties",
            Self::AdditionalProperties(_) => "additionalProperties",
            Self::Required(_) => "required",
            Self::MinProperties(_) => "minProperties",
            Self::MaxProperties(_) => "maxProperties",
            Self::PropertyNames(_) => "propertyNames",
            Self::Dependencies(_) => "dependencies",
            Self::AllOf(_) => "allOf",
            Self::AnyOf(_) => "anyOf",
            Self::OneOf(_) => "oneOf",
            Self::Not(_) => "not",
            Self::Ref(_) => "$ref",
            Self::Definitions(_) => "definitions",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(keywords: Vec<Keyword>) -> SchemaNode {
        SchemaNode::object(
            JsonPointer::root(),
            ObjectSchema {
                keywords,
                ..ObjectSchema::default()
            },
        )
    }

    #[test]
    fn type_names_parse_and_render() {
        assert_eq!(TypeName::parse("integer"), Some(TypeName::Integer));
        assert_eq!(TypeName::parse("float"), None);
        assert_eq!(TypeName::Integer.as_str(), "integer");
    }

    #[test]
    fn integer_type_accepts_integral_floats() {
        assert!(TypeName::Integer.matches(&json!(1)));
        assert!(TypeName::Integer.matches(&json!(1.0)));
        assert!(!TypeName::Integer.matches(&json!(1.5)));
        assert!(!TypeName::Integer.matches(&json!("1")));
    }

    #[test]
    fn type_sets_match_any_member() {
        let set = TypeSet::new(vec![TypeName::String, TypeName::Null]);
        assert!(set.matches(&json!(null)));
        assert!(set.matches(&json!("x")));
        assert!(!set.matches(&json!(3)));
        assert_eq!(set.to_string(), "string or null");
    }

    #[test]
    fn patterns_search_unanchored() {
        let pattern = Pattern::new("b+c").unwrap();
        assert!(pattern.is_match("aabbcc"));
        assert!(!pattern.is_match("acb"));
        assert_eq!(pattern.source(), "b+c");
    }

    #[test]
    fn patterns_compare_by_source() {
        let left = Pattern::new("a|b").unwrap();
        let right = Pattern::new("a|b").unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn descend_steps_through_subschema_keywords() {
        let inner = SchemaNode::boolean(
            JsonPointer::parse("/properties/a").unwrap(),
            false,
        );
        let root = node(vec![
            Keyword::Properties(vec![("a".to_string(), inner.clone())]),
            Keyword::Required(vec!["a".to_string()]),
        ]);

        let found = root.descend(&JsonPointer::parse("/properties/a").unwrap());
        assert_eq!(found, Some(&inner));
        assert!(root.descend(&JsonPointer::parse("/required/0").unwrap()).is_none());
        assert!(root.descend(&JsonPointer::parse("/properties/b").unwrap()).is_none());
    }

    #[test]
    fn descend_indexes_combinator_branches() {
        let first = SchemaNode::boolean(JsonPointer::parse("/allOf/0").unwrap(), true);
        let second = SchemaNode::boolean(JsonPointer::parse("/allOf/1").unwrap(), false);
        let root = node(vec![Keyword::AllOf(vec![first, second.clone()])]);

        let found = root.descend(&JsonPointer::parse("/allOf/1").unwrap());
        assert_eq!(found, Some(&second));
        assert!(root.descend(&JsonPointer::parse("/allOf/2").unwrap()).is_none());
    }

    #[test]
    fn descend_resolves_the_root_pointer_to_self() {
        let root = node(vec![]);
        assert_eq!(root.descend(&JsonPointer::root()), Some(&root));
    }
}
