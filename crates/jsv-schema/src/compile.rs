//! Keyword tree construction from raw documents
//!
//! Compilation walks a raw JSON value and produces [`SchemaNode`] trees,
//! resolving every `$ref` and `$id` against the active resolution scope as
//! it goes. Structural mistakes fail the whole load here rather than
//! surfacing later as puzzling validation results.

use std::cmp::Ordering;

use jsv_core::{JsonKind, JsonPointer, number};
use serde_json::{Map, Number, Value};
use url::Url;

use crate::model::{
    Additional, Dependency, Items, Keyword, ObjectSchema, Pattern, Reference, SchemaNode,
    TypeName, TypeSet,
};
use crate::{LoadError, ResolutionError, Result};

/// A compiled node plus everything the loader must follow up on.
#[derive(Debug)]
pub(crate) struct CompiledSchema {
    pub node: SchemaNode,
    /// Absolute reference targets collected from the subtree, in document order.
    pub references: Vec<String>,
    /// Identifier anchors declared in the subtree: absolute URI to location.
    pub anchors: Vec<(String, JsonPointer)>,
}

/// Compile a whole document rooted at the given resolution scope.
pub(crate) fn compile_document(raw: &Value, scope: Option<&Url>) -> Result<CompiledSchema> {
    let mut compiler = Compiler::default();
    let node = compiler.compile(raw, JsonPointer::root(), scope)?;
    Ok(CompiledSchema {
        node,
        references: compiler.references,
        anchors: compiler.anchors,
    })
}

/// Compile the value at a raw document location that sits outside the
/// keyword tree, such as a subschema buried in an extension member.
///
/// Returns `None` when the pointer does not resolve in the raw document.
/// The resolution scope is recomputed by walking identifier declarations
/// along the pointer path.
pub(crate) fn compile_fragment(
    document: &Value,
    pointer: &JsonPointer,
    document_scope: Option<&Url>,
) -> Result<Option<CompiledSchema>> {
    let Some(raw) = pointer.resolve(document) else {
        return Ok(None);
    };
    let scope = scope_at(document, pointer, document_scope);
    let mut compiler = Compiler::default();
    let node = compiler.compile(raw, pointer.clone(), scope.as_ref())?;
    Ok(Some(CompiledSchema {
        node,
        references: compiler.references,
        anchors: compiler.anchors,
    }))
}

#[derive(Default)]
struct Compiler {
    references: Vec<String>,
    anchors: Vec<(String, JsonPointer)>,
}

impl Compiler {
    fn compile(
        &mut self,
        value: &Value,
        location: JsonPointer,
        scope: Option<&Url>,
    ) -> Result<SchemaNode> {
        match value {
            Value::Bool(accept) => Ok(SchemaNode::boolean(location, *accept)),
            Value::Object(members) => self.compile_object(members, location, scope),
            other => Err(LoadError::structure(
                &location,
                format!(
                    "schema must be an object or boolean, found {}",
                    JsonKind::of(other)
                ),
            )),
        }
    }

    fn compile_object(
        &mut self,
        members: &Map<String, Value>,
        location: JsonPointer,
        outer_scope: Option<&Url>,
    ) -> Result<SchemaNode> {
        let mut schema = ObjectSchema::default();

        // `$id` wins over the legacy `id` spelling when both are present.
        let declared = members
            .get("$id")
            .map(|value| ("$id", value))
            .or_else(|| members.get("id").map(|value| ("id", value)));
        let scope_owned: Option<Url>;
        if let Some((key, raw_id)) = declared {
            let path = location.child(key);
            let Value::String(text) = raw_id else {
                return Err(LoadError::structure(&path, "identifier must be a string"));
            };
            let (anchor, new_scope) = declare_scope(text, outer_scope, &path)?;
            self.anchors.push((anchor.clone(), location.clone()));
            schema.id = Some(anchor);
            scope_owned = new_scope;
        } else {
            scope_owned = None;
        }
        let scope = scope_owned.as_ref().or(outer_scope);

        for (key, member) in members {
            let path = location.child(key.as_str());
            match key.as_str() {
                "$id" | "id" => {}
                "title" => schema.title = Some(expect_string(member, &path)?.to_string()),
                "description" => {
                    schema.description = Some(expect_string(member, &path)?.to_string());
                }
                "type" => schema.keywords.push(Keyword::Type(parse_type_set(member, &path)?)),
                "enum" => {
                    let values = expect_array(member, &path)?;
                    if values.is_empty() {
                        return Err(LoadError::structure(&path, "must list at least one value"));
                    }
                    schema.keywords.push(Keyword::Enum(values.clone()));
                }
                "const" => schema.keywords.push(Keyword::Const(member.clone())),
                "multipleOf" => {
                    let divisor = expect_number(member, &path)?;
                    if number::compare(&divisor, &Number::from(0u32)) != Ordering::Greater {
                        return Err(LoadError::structure(&path, "must be strictly positive"));
                    }
                    schema.keywords.push(Keyword::MultipleOf(divisor));
                }
                "minimum" => {
                    schema.keywords.push(Keyword::Minimum(expect_number(member, &path)?));
                }
                "maximum" => {
                    schema.keywords.push(Keyword::Maximum(expect_number(member, &path)?));
                }
                "exclusiveMinimum" => {
                    let bound = parse_exclusive_bound(member, &path)?;
                    schema.keywords.push(Keyword::ExclusiveMinimum(bound));
                }
                "exclusiveMaximum" => {
                    let bound = parse_exclusive_bound(member, &path)?;
                    schema.keywords.push(Keyword::ExclusiveMaximum(bound));
                }
                "minLength" => {
                    schema.keywords.push(Keyword::MinLength(parse_count(member, &path)?));
                }
                "maxLength" => {
                    schema.keywords.push(Keyword::MaxLength(parse_count(member, &path)?));
                }
                "pattern" => {
                    let text = expect_string(member, &path)?;
                    let pattern = Pattern::new(text).map_err(|error| {
                        LoadError::structure(&path, format!("invalid regular expression: {error}"))
                    })?;
                    schema.keywords.push(Keyword::Pattern(pattern));
                }
                "format" => {
                    schema
                        .keywords
                        .push(Keyword::Format(expect_string(member, &path)?.to_string()));
                }
                "items" => {
                    let items = match member {
                        Value::Array(entries) => {
                            let mut nodes = Vec::with_capacity(entries.len());
                            for (index, entry) in entries.iter().enumerate() {
                                nodes.push(self.compile(entry, path.child_index(index), scope)?);
                            }
                            Items::Tuple(nodes)
                        }
                        other => Items::Uniform(Box::new(self.compile(other, path, scope)?)),
                    };
                    schema.keywords.push(Keyword::Items(items));
                }
                "additionalItems" => {
                    let policy = self.parse_additional(member, path, scope)?;
                    schema.keywords.push(Keyword::AdditionalItems(policy));
                }
                "minItems" => {
                    schema.keywords.push(Keyword::MinItems(parse_count(member, &path)?));
                }
                "maxItems" => {
                    schema.keywords.push(Keyword::MaxItems(parse_count(member, &path)?));
                }
                "uniqueItems" => {
                    schema.keywords.push(Keyword::UniqueItems(expect_bool(member, &path)?));
                }
                "contains" => {
                    let node = self.compile(member, path, scope)?;
                    schema.keywords.push(Keyword::Contains(Box::new(node)));
                }
                "properties" => {
                    let entries = self.compile_entry_map(member, &path, scope)?;
                    schema.keywords.push(Keyword::Properties(entries));
                }
                "patternProperties" => {
                    let raw_entries = expect_object(member, &path)?;
                    let mut entries = Vec::with_capacity(raw_entries.len());
                    for (name, entry) in raw_entries {
                        let entry_path = path.child(name.as_str());
                        let pattern = Pattern::new(name.as_str()).map_err(|error| {
                            LoadError::structure(
                                &entry_path,
                                format!("invalid regular expression: {error}"),
                            )
                        })?;
                        entries.push((pattern, self.compile(entry, entry_path, scope)?));
                    }
                    schema.keywords.push(Keyword::PatternProperties(entries));
                }
                "additionalProperties" => {
                    let policy = self.parse_additional(member, path, scope)?;
                    schema.keywords.push(Keyword::AdditionalProperties(policy));
                }
                "required" => {
                    schema
                        .keywords
                        .push(Keyword::Required(parse_string_array(member, &path)?));
                }
                "minProperties" => {
                    schema.keywords.push(Keyword::MinProperties(parse_count(member, &path)?));
                }
                "maxProperties" => {
                    schema.keywords.push(Keyword::MaxProperties(parse_count(member, &path)?));
                }
                "propertyNames" => {
                    let node = self.compile(member, path, scope)?;
                    schema.keywords.push(Keyword::PropertyNames(Box::new(node)));
                }
                "dependencies" => {
                    let raw_entries = expect_object(member, &path)?;
                    let mut entries = Vec::with_capacity(raw_entries.len());
                    for (name, entry) in raw_entries {
                        let entry_path = path.child(name.as_str());
                        let dependency = match entry {
                            Value::Array(_) => {
                                Dependency::Required(parse_string_array(entry, &entry_path)?)
                            }
                            other => Dependency::Schema(Box::new(self.compile(
                                other, entry_path, scope,
                            )?)),
                        };
                        entries.push((name.clone(), dependency));
                    }
                    schema.keywords.push(Keyword::Dependencies(entries));
                }
                "allOf" => {
                    let branches = self.compile_branches(member, &path, scope)?;
                    schema.keywords.push(Keyword::AllOf(branches));
                }
                "anyOf" => {
                    let branches = self.compile_branches(member, &path, scope)?;
                    schema.keywords.push(Keyword::AnyOf(branches));
                }
                "oneOf" => {
                    let branches = self.compile_branches(member, &path, scope)?;
                    schema.keywords.push(Keyword::OneOf(branches));
                }
                "not" => {
                    let node = self.compile(member, path, scope)?;
                    schema.keywords.push(Keyword::Not(Box::new(node)));
                }
                "$ref" => {
                    let raw = expect_string(member, &path)?;
                    let reference = self.resolve_reference(raw, scope)?;
                    schema.keywords.push(Keyword::Ref(reference));
                }
                "definitions" => {
                    let entries = self.compile_entry_map(member, &path, scope)?;
                    schema.keywords.push(Keyword::Definitions(entries));
                }
                _ => {
                    schema.extensions.insert(key.clone(), member.clone());
                }
            }
        }

        Ok(SchemaNode::object(location, schema))
    }

    fn compile_entry_map(
        &mut self,
        value: &Value,
        path: &JsonPointer,
        scope: Option<&Url>,
    ) -> Result<Vec<(String, SchemaNode)>> {
        let raw_entries = expect_object(value, path)?;
        let mut entries = Vec::with_capacity(raw_entries.len());
        for (name, entry) in raw_entries {
            let node = self.compile(entry, path.child(name.as_str()), scope)?;
            entries.push((name.clone(), node));
        }
        Ok(entries)
    }

    fn compile_branches(
        &mut self,
        value: &Value,
        path: &JsonPointer,
        scope: Option<&Url>,
    ) -> Result<Vec<SchemaNode>> {
        let raw_branches = expect_array(value, path)?;
        if raw_branches.is_empty() {
            return Err(LoadError::structure(path, "must list at least one subschema"));
        }
        let mut branches = Vec::with_capacity(raw_branches.len());
        for (index, branch) in raw_branches.iter().enumerate() {
            branches.push(self.compile(branch, path.child_index(index), scope)?);
        }
        Ok(branches)
    }

    fn parse_additional(
        &mut self,
        value: &Value,
        path: JsonPointer,
        scope: Option<&Url>,
    ) -> Result<Additional> {
        match value {
            Value::Bool(permitted) => Ok(Additional::Permitted(*permitted)),
            other => Ok(Additional::Schema(Box::new(self.compile(other, path, scope)?))),
        }
    }

    fn resolve_reference(&mut self, raw: &str, scope: Option<&Url>) -> Result<Reference> {
        let target = resolve_target(raw, scope).map_err(|reason| {
            ResolutionError::MalformedReference {
                reference: raw.to_string(),
                reason,
            }
        })?;
        self.references.push(target.clone());
        Ok(Reference {
            raw: raw.to_string(),
            target,
        })
    }
}

/// Resolve reference text to an absolute target.
///
/// With a scope this is plain RFC 3986 reference resolution. Without one,
/// only absolute URIs and same-document fragments are meaningful; anything
/// else has no base to resolve against.
fn resolve_target(raw: &str, scope: Option<&Url>) -> std::result::Result<String, String> {
    if let Some(base) = scope {
        return base
            .join(raw)
            .map(|url| url.to_string())
            .map_err(|error| error.to_string());
    }
    if let Ok(absolute) = Url::parse(raw) {
        return Ok(absolute.to_string());
    }
    if raw.is_empty() || raw.starts_with('#') {
        return Ok(raw.to_string());
    }
    Err("relative reference with no resolution scope".to_string())
}

/// Resolve an identifier declaration to an anchor key and, when it moves the
/// scope, the new scope.
fn declare_scope(
    text: &str,
    outer: Option<&Url>,
    path: &JsonPointer,
) -> Result<(String, Option<Url>)> {
    if let Some(base) = outer {
        let joined = base
            .join(text)
            .map_err(|error| LoadError::structure(path, format!("invalid identifier: {error}")))?;
        let joined = strip_empty_fragment(joined);
        return Ok((joined.to_string(), Some(joined)));
    }
    if let Ok(absolute) = Url::parse(text) {
        let absolute = strip_empty_fragment(absolute);
        return Ok((absolute.to_string(), Some(absolute)));
    }
    if text.starts_with('#') {
        // A plain fragment identifier registers an anchor without moving
        // the scope.
        return Ok((text.to_string(), None));
    }
    Err(LoadError::structure(
        path,
        "relative identifier with no resolution scope",
    ))
}

/// Drop an empty fragment from a declared identifier; `X#` and `X` name
/// the same schema.
fn strip_empty_fragment(mut url: Url) -> Url {
    if url.fragment() == Some("") {
        url.set_fragment(None);
    }
    url
}

/// Resolution scope in effect at a raw document location, found by applying
/// identifier declarations along the pointer path. The target's own
/// identifier is left for compilation to handle.
fn scope_at(document: &Value, pointer: &JsonPointer, base: Option<&Url>) -> Option<Url> {
    let mut scope = base.cloned();
    let mut current = document;
    for segment in pointer.segments() {
        scope = apply_raw_scope(current, scope);
        current = match current {
            Value::Object(members) => members.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return scope,
        };
    }
    scope
}

/// Apply a raw node's identifier to the running scope, ignoring values that
/// are not usable identifiers. Ancestors on an auxiliary path are arbitrary
/// JSON, so this stays lenient where compilation is strict.
fn apply_raw_scope(value: &Value, scope: Option<Url>) -> Option<Url> {
    let Value::Object(members) = value else {
        return scope;
    };
    let id_value = members.get("$id").or_else(|| members.get("id"))?;
    let Value::String(text) = id_value else {
        return scope;
    };
    match &scope {
        Some(base) => base.join(text).ok().or(scope),
        None => Url::parse(text).ok(),
    }
}

fn parse_type_set(value: &Value, path: &JsonPointer) -> Result<TypeSet> {
    match value {
        Value::String(name) => Ok(TypeSet::new(vec![parse_type_name(name, path)?])),
        Value::Array(names) => {
            if names.is_empty() {
                return Err(LoadError::structure(path, "must name at least one type"));
            }
            let mut parsed = Vec::with_capacity(names.len());
            for (index, entry) in names.iter().enumerate() {
                let entry_path = path.child_index(index);
                let Value::String(name) = entry else {
                    return Err(LoadError::structure(&entry_path, "type name must be a string"));
                };
                parsed.push(parse_type_name(name, &entry_path)?);
            }
            Ok(TypeSet::new(parsed))
        }
        _ => Err(LoadError::structure(
            path,
            "must be a type name or array of type names",
        )),
    }
}

fn parse_type_name(name: &str, path: &JsonPointer) -> Result<TypeName> {
    TypeName::parse(name)
        .ok_or_else(|| LoadError::structure(path, format!("unknown type name '{name}'")))
}

fn parse_exclusive_bound(value: &Value, path: &JsonPointer) -> Result<Number> {
    if value.is_boolean() {
        return Err(LoadError::structure(
            path,
            "boolean form is not supported; use a numeric bound",
        ));
    }
    expect_number(value, path)
}

fn parse_count(value: &Value, path: &JsonPointer) -> Result<u64> {
    if let Value::Number(number) = value {
        if let Some(count) = number.as_u64() {
            return Ok(count);
        }
        if let Some(float) = number.as_f64() {
            if float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64 {
                return Ok(float as u64);
            }
        }
    }
    Err(LoadError::structure(path, "must be a non-negative integer"))
}

fn parse_string_array(value: &Value, path: &JsonPointer) -> Result<Vec<String>> {
    let entries = expect_array(value, path)?;
    let mut names = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Value::String(name) = entry else {
            return Err(LoadError::structure(
                &path.child_index(index),
                format!("must be a string, found {}", JsonKind::of(entry)),
            ));
        };
        names.push(name.clone());
    }
    Ok(names)
}

fn expect_string<'a>(value: &'a Value, path: &JsonPointer) -> Result<&'a str> {
    match value {
        Value::String(text) => Ok(text),
        other => Err(LoadError::structure(
            path,
            format!("must be a string, found {}", JsonKind::of(other)),
        )),
    }
}

fn expect_number(value: &Value, path: &JsonPointer) -> Result<Number> {
    match value {
        Value::Number(number) => Ok(number.clone()),
        other => Err(LoadError::structure(
            path,
            format!("must be a number, found {}", JsonKind::of(other)),
        )),
    }
}

fn expect_bool(value: &Value, path: &JsonPointer) -> Result<bool> {
    match value {
        Value::Bool(flag) => Ok(*flag),
        other => Err(LoadError::structure(
            path,
            format!("must be a boolean, found {}", JsonKind::of(other)),
        )),
    }
}

fn expect_array<'a>(value: &'a Value, path: &JsonPointer) -> Result<&'a Vec<Value>> {
    match value {
        Value::Array(entries) => Ok(entries),
        other => Err(LoadError::structure(
            path,
            format!("must be an array, found {}", JsonKind::of(other)),
        )),
    }
}

fn expect_object<'a>(value: &'a Value, path: &JsonPointer) -> Result<&'a Map<String, Value>> {
    match value {
        Value::Object(members) => Ok(members),
        other => Err(LoadError::structure(
            path,
            format!("must be an object, found {}", JsonKind::of(other)),
        )),
    }
}
