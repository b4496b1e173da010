//! Validation engine
//!
//! Walks the schema keyword tree alongside the instance and collects every
//! keyword failure into a [`ViolationReport`]. References are dereferenced
//! against the schema's document set as they are crossed, and a recursion
//! depth cap keeps cyclic schemas from descending forever.

use jsv_core::JsonPointer;
use jsv_schema::{
    Additional, Dependency, DocumentSet, Items, Keyword, ObjectSchema, Schema, SchemaForm,
    SchemaNode,
};
use serde_json::{Map, Value};
use tracing::debug;

use crate::formats::FormatRegistry;
use crate::reporter::{Violation, ViolationReport};
use crate::rules::{self, RuleResult};

/// Validation configuration
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Schema recursion budget; crossing it records a violation instead of
    /// descending further
    pub max_depth: usize,
    /// Report unknown `format` names instead of ignoring them
    pub strict_formats: bool,
    /// Format checks applied by the `format` keyword
    pub formats: FormatRegistry,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            strict_formats: false,
            formats: FormatRegistry::with_defaults(),
        }
    }
}

/// Main validation engine
#[derive(Debug, Default)]
pub struct ValidationEngine {
    config: ValidationConfig,
}

impl ValidationEngine {
    /// Create a new validation engine
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ValidationConfig::default(),
        }
    }

    /// Create with specific configuration
    #[must_use]
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Configuration in effect
    #[must_use]
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate an instance against a loaded schema
    ///
    /// Returns the report of every violation found; an empty report means
    /// the instance conforms. An error is returned only when the engine
    /// itself fails, such as a reference that no longer resolves against
    /// the schema's document set.
    pub fn validate(&self, schema: &Schema, instance: &Value) -> crate::Result<ViolationReport> {
        let mut report = ViolationReport::new();
        self.validate_node(
            schema.documents(),
            schema.root(),
            instance,
            &JsonPointer::root(),
            0,
            &mut report,
        )?;
        debug!("Validation finished with {} violation(s)", report.len());
        Ok(report)
    }

    /// Validate and report only whether the instance conforms
    pub fn is_valid(&self, schema: &Schema, instance: &Value) -> crate::Result<bool> {
        Ok(self.validate(schema, instance)?.is_valid())
    }

    fn validate_node(
        &self,
        documents: &DocumentSet,
        node: &SchemaNode,
        instance: &Value,
        path: &JsonPointer,
        depth: usize,
        report: &mut ViolationReport,
    ) -> crate::Result<()> {
        if depth >= self.config.max_depth {
            record(
                report,
                path,
                node,
                "maxDepth",
                format!(
                    "Validation depth exceeded the configured maximum of {}",
                    self.config.max_depth
                ),
            );
            return Ok(());
        }

        let schema = match &node.form {
            SchemaForm::Boolean(true) => return Ok(()),
            SchemaForm::Boolean(false) => {
                record(report, path, node, "schema", "False schema permits no value");
                return Ok(());
            }
            SchemaForm::Object(schema) => schema,
        };

        // A reference replaces every sibling keyword.
        if let Some(reference) = schema.reference() {
            let target = documents.resolve(reference)?;
            return self.validate_node(documents, target, instance, path, depth + 1, report);
        }

        // A failed type check suppresses the remaining keywords; they would
        // only restate the mismatch in less direct terms.
        if let Some(Keyword::Type(expected)) = schema.keyword("type") {
            let result = rules::validate_type(expected, instance);
            if !result.is_valid {
                apply(report, path, node, "type", result);
                return Ok(());
            }
        }

        for keyword in &schema.keywords {
            match keyword {
                Keyword::Type(_) | Keyword::Ref(_) | Keyword::Definitions(_) => {}
                Keyword::Enum(permitted) => {
                    apply(
                        report,
                        path,
                        node,
                        "enum",
                        rules::validate_enum(permitted, instance),
                    );
                }
                Keyword::Const(expected) => {
                    apply(
                        report,
                        path,
                        node,
                        "const",
                        rules::validate_const(expected, instance),
                    );
                }
                Keyword::MultipleOf(divisor) => {
                    if let Value::Number(value) = instance {
                        apply(
                            report,
                            path,
                            node,
                            "multipleOf",
                            rules::validate_multiple_of(divisor, value),
                        );
                    }
                }
                Keyword::Minimum(bound) => {
                    if let Value::Number(value) = instance {
                        apply(
                            report,
                            path,
                            node,
                            "minimum",
                            rules::validate_minimum(bound, value),
                        );
                    }
                }
                Keyword::ExclusiveMinimum(bound) => {
                    if let Value::Number(value) = instance {
                        apply(
                            report,
                            path,
                            node,
                            "exclusiveMinimum",
                            rules::validate_exclusive_minimum(bound, value),
                        );
                    }
                }
                Keyword::Maximum(bound) => {
                    if let Value::Number(value) = instance {
                        apply(
                            report,
                            path,
                            node,
                            "maximum",
                            rules::validate_maximum(bound, value),
                        );
                    }
                }
                Keyword::ExclusiveMaximum(bound) => {
                    if let Value::Number(value) = instance {
                        apply(
                            report,
                            path,
                            node,
                            "exclusiveMaximum",
                            rules::validate_exclusive_maximum(bound, value),
                        );
                    }
                }
                Keyword::MinLength(minimum) => {
                    if let Value::String(value) = instance {
                        apply(
                            report,
                            path,
                            node,
                            "minLength",
                            rules::validate_min_length(*minimum, value),
                        );
                    }
                }
                Keyword::MaxLength(maximum) => {
                    if let Value::String(value) = instance {
                        apply(
                            report,
                            path,
                            node,
                            "maxLength",
                            rules::validate_max_length(*maximum, value),
                        );
                    }
                }
                Keyword::Pattern(pattern) => {
                    if let Value::String(value) = instance {
                        apply(
                            report,
                            path,
                            node,
                            "pattern",
                            rules::validate_pattern(pattern, value),
                        );
                    }
                }
                Keyword::Format(name) => {
                    if let Value::String(value) = instance {
                        self.check_format(report, path, node, name, value);
                    }
                }
                Keyword::Items(items) => {
                    if let Value::Array(elements) = instance {
                        self.validate_items(documents, items, elements, path, depth, report)?;
                    }
                }
                Keyword::AdditionalItems(policy) => {
                    if let Value::Array(elements) = instance {
                        self.validate_additional_items(
                            documents, schema, node, policy, elements, path, depth, report,
                        )?;
                    }
                }
                Keyword::MinItems(minimum) => {
                    if let Value::Array(elements) = instance {
                        apply(
                            report,
                            path,
                            node,
                            "minItems",
                            rules::validate_min_items(*minimum, elements.len()),
                        );
                    }
                }
                Keyword::MaxItems(maximum) => {
                    if let Value::Array(elements) = instance {
                        apply(
                            report,
                            path,
                            node,
                            "maxItems",
                            rules::validate_max_items(*maximum, elements.len()),
                        );
                    }
                }
                Keyword::UniqueItems(required) => {
                    if let Value::Array(elements) = instance {
                        if *required {
                            apply(
                                report,
                                path,
                                node,
                                "uniqueItems",
                                rules::validate_unique_items(elements),
                            );
                        }
                    }
                }
                Keyword::Contains(contains_schema) => {
                    if let Value::Array(elements) = instance {
                        self.validate_contains(
                            documents,
                            contains_schema,
                            node,
                            elements,
                            path,
                            depth,
                            report,
                        )?;
                    }
                }
                Keyword::Properties(entries) => {
                    if let Value::Object(members) = instance {
                        for (name, member_schema) in entries {
                            if let Some(member) = members.get(name) {
                                self.validate_node(
                                    documents,
                                    member_schema,
                                    member,
                                    &path.child(name.as_str()),
                                    depth + 1,
                                    report,
                                )?;
                            }
                        }
                    }
                }
                Keyword::PatternProperties(entries) => {
                    if let Value::Object(members) = instance {
                        for (pattern, member_schema) in entries {
                            for (name, member) in members {
                                if pattern.is_match(name) {
                                    self.validate_node(
                                        documents,
                                        member_schema,
                                        member,
                                        &path.child(name.as_str()),
                                        depth + 1,
                                        report,
                                    )?;
                                }
                            }
                        }
                    }
                }
                Keyword::AdditionalProperties(policy) => {
                    if let Value::Object(members) = instance {
                        self.validate_additional_properties(
                            documents, schema, node, policy, members, path, depth, report,
                        )?;
                    }
                }
                Keyword::Required(names) => {
                    if let Value::Object(members) = instance {
                        for name in names {
                            if !members.contains_key(name) {
                                record(
                                    report,
                                    path,
                                    node,
                                    "required",
                                    format!("Required member '{name}' is missing"),
                                );
                            }
                        }
                    }
                }
                Keyword::MinProperties(minimum) => {
                    if let Value::Object(members) = instance {
                        apply(
                            report,
                            path,
                            node,
                            "minProperties",
                            rules::validate_min_properties(*minimum, members.len()),
                        );
                    }
                }
                Keyword::MaxProperties(maximum) => {
                    if let Value::Object(members) = instance {
                        apply(
                            report,
                            path,
                            node,
                            "maxProperties",
                            rules::validate_max_properties(*maximum, members.len()),
                        );
                    }
                }
                Keyword::PropertyNames(name_schema) => {
                    if let Value::Object(members) = instance {
                        self.validate_property_names(
                            documents,
                            name_schema,
                            node,
                            members,
                            path,
                            depth,
                            report,
                        )?;
                    }
                }
                Keyword::Dependencies(entries) => {
                    if let Value::Object(members) = instance {
                        self.validate_dependencies(
                            documents, entries, node, members, instance, path, depth, report,
                        )?;
                    }
                }
                Keyword::AllOf(branches) => {
                    for branch in branches {
                        self.validate_node(documents, branch, instance, path, depth + 1, report)?;
                    }
                }
                Keyword::AnyOf(branches) => {
                    self.validate_any_of(documents, branches, node, instance, path, depth, report)?;
                }
                Keyword::OneOf(branches) => {
                    self.validate_one_of(documents, branches, node, instance, path, depth, report)?;
                }
                Keyword::Not(forbidden) => {
                    let mut probe = ViolationReport::new();
                    self.validate_node(documents, forbidden, instance, path, depth + 1, &mut probe)?;
                    if probe.is_empty() {
                        record(
                            report,
                            path,
                            node,
                            "not",
                            "Instance must not match the forbidden schema",
                        );
                    }
                }
            }
        }

        Ok(())
    }

    fn validate_items(
        &self,
        documents: &DocumentSet,
        items: &Items,
        elements: &[Value],
        path: &JsonPointer,
        depth: usize,
        report: &mut ViolationReport,
    ) -> crate::Result<()> {
        match items {
            Items::Uniform(element_schema) => {
                for (index, element) in elements.iter().enumerate() {
                    self.validate_node(
                        documents,
                        element_schema,
                        element,
                        &path.child_index(index),
                        depth + 1,
                        report,
                    )?;
                }
            }
            Items::Tuple(positional) => {
                for (index, (element, element_schema)) in
                    elements.iter().zip(positional).enumerate()
                {
                    self.validate_node(
                        documents,
                        element_schema,
                        element,
                        &path.child_index(index),
                        depth + 1,
                        report,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn validate_additional_items(
        &self,
        documents: &DocumentSet,
        schema: &ObjectSchema,
        node: &SchemaNode,
        policy: &Additional,
        elements: &[Value],
        path: &JsonPointer,
        depth: usize,
        report: &mut ViolationReport,
    ) -> crate::Result<()> {
        // Only meaningful past the end of positional `items` schemas.
        let Some(Keyword::Items(Items::Tuple(positional))) = schema.keyword("items") else {
            return Ok(());
        };
        if elements.len() <= positional.len() {
            return Ok(());
        }
        match policy {
            Additional::Permitted(true) => {}
            Additional::Permitted(false) => {
                record(
                    report,
                    path,
                    node,
                    "additionalItems",
                    format!(
                        "Array has {} elements but only {} are specified",
                        elements.len(),
                        positional.len()
                    ),
                );
            }
            Additional::Schema(extra_schema) => {
                for (index, element) in elements.iter().enumerate().skip(positional.len()) {
                    self.validate_node(
                        documents,
                        extra_schema,
                        element,
                        &path.child_index(index),
                        depth + 1,
                        report,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn validate_contains(
        &self,
        documents: &DocumentSet,
        contains_schema: &SchemaNode,
        node: &SchemaNode,
        elements: &[Value],
        path: &JsonPointer,
        depth: usize,
        report: &mut ViolationReport,
    ) -> crate::Result<()> {
        for (index, element) in elements.iter().enumerate() {
            let mut probe = ViolationReport::new();
            self.validate_node(
                documents,
                contains_schema,
                element,
                &path.child_index(index),
                depth + 1,
                &mut probe,
            )?;
            if probe.is_empty() {
                return Ok(());
            }
        }
        record(
            report,
            path,
            node,
            "contains",
            "No array element matches the required schema",
        );
        Ok(())
    }

    fn validate_additional_properties(
        &self,
        documents: &DocumentSet,
        schema: &ObjectSchema,
        node: &SchemaNode,
        policy: &Additional,
        members: &Map<String, Value>,
        path: &JsonPointer,
        depth: usize,
        report: &mut ViolationReport,
    ) -> crate::Result<()> {
        for (name, member) in members {
            if is_covered_member(schema, name) {
                continue;
            }
            match policy {
                Additional::Permitted(true) => {}
                Additional::Permitted(false) => {
                    record(
                        report,
                        &path.child(name.as_str()),
                        node,
                        "additionalProperties",
                        format!("Additional member '{name}' is not permitted"),
                    );
                }
                Additional::Schema(extra_schema) => {
                    self.validate_node(
                        documents,
                        extra_schema,
                        member,
                        &path.child(name.as_str()),
                        depth + 1,
                        report,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn validate_property_names(
        &self,
        documents: &DocumentSet,
        name_schema: &SchemaNode,
        node: &SchemaNode,
        members: &Map<String, Value>,
        path: &JsonPointer,
        depth: usize,
        report: &mut ViolationReport,
    ) -> crate::Result<()> {
        for name in members.keys() {
            let candidate = Value::String(name.clone());
            let mut probe = ViolationReport::new();
            self.validate_node(documents, name_schema, &candidate, path, depth + 1, &mut probe)?;
            if !probe.is_empty() {
                let reasons: Vec<String> = probe
                    .iter()
                    .map(|violation| violation.message.clone())
                    .collect();
                record(
                    report,
                    path,
                    node,
                    "propertyNames",
                    format!("Member name '{name}' is invalid: {}", reasons.join("; ")),
                );
            }
        }
        Ok(())
    }

    fn validate_dependencies(
        &self,
        documents: &DocumentSet,
        entries: &[(String, Dependency)],
        node: &SchemaNode,
        members: &Map<String, Value>,
        instance: &Value,
        path: &JsonPointer,
        depth: usize,
        report: &mut ViolationReport,
    ) -> crate::Result<()> {
        for (name, dependency) in entries {
            if !members.contains_key(name) {
                continue;
            }
            match dependency {
                Dependency::Required(required) => {
                    for needed in required {
                        if !members.contains_key(needed) {
                            record(
                                report,
                                path,
                                node,
                                "dependencies",
                                format!("Member '{name}' requires member '{needed}'"),
                            );
                        }
                    }
                }
                Dependency::Schema(dependent_schema) => {
                    self.validate_node(
                        documents,
                        dependent_schema,
                        instance,
                        path,
                        depth + 1,
                        report,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn validate_any_of(
        &self,
        documents: &DocumentSet,
        branches: &[SchemaNode],
        node: &SchemaNode,
        instance: &Value,
        path: &JsonPointer,
        depth: usize,
        report: &mut ViolationReport,
    ) -> crate::Result<()> {
        let mut failures = ViolationReport::new();
        for branch in branches {
            let mut probe = ViolationReport::new();
            self.validate_node(documents, branch, instance, path, depth + 1, &mut probe)?;
            if probe.is_empty() {
                return Ok(());
            }
            failures.extend(probe);
        }
        record(
            report,
            path,
            node,
            "anyOf",
            format!(
                "Value does not match any of the {} alternatives",
                branches.len()
            ),
        );
        report.extend(failures);
        Ok(())
    }

    fn validate_one_of(
        &self,
        documents: &DocumentSet,
        branches: &[SchemaNode],
        node: &SchemaNode,
        instance: &Value,
        path: &JsonPointer,
        depth: usize,
        report: &mut ViolationReport,
    ) -> crate::Result<()> {
        let mut matching = Vec::new();
        let mut failures = ViolationReport::new();
        for (index, branch) in branches.iter().enumerate() {
            let mut probe = ViolationReport::new();
            self.validate_node(documents, branch, instance, path, depth + 1, &mut probe)?;
            if probe.is_empty() {
                matching.push(index);
            } else {
                failures.extend(probe);
            }
        }
        match matching.as_slice() {
            [_] => {}
            [] => {
                record(
                    report,
                    path,
                    node,
                    "oneOf",
                    format!("Value matched none of the {} alternatives", branches.len()),
                );
                report.extend(failures);
            }
            indices => {
                let listed: Vec<String> = indices.iter().map(ToString::to_string).collect();
                record(
                    report,
                    path,
                    node,
                    "oneOf",
                    format!(
                        "Value matched alternatives {} where exactly one is permitted",
                        listed.join(", ")
                    ),
                );
            }
        }
        Ok(())
    }

    fn check_format(
        &self,
        report: &mut ViolationReport,
        path: &JsonPointer,
        node: &SchemaNode,
        name: &str,
        value: &str,
    ) {
        match self.config.formats.get(name) {
            Some(check) => {
                if let Err(message) = check(value) {
                    record(report, path, node, "format", message);
                }
            }
            None => {
                if self.config.strict_formats {
                    record(
                        report,
                        path,
                        node,
                        "format",
                        format!("Format '{name}' is not recognized"),
                    );
                }
            }
        }
    }
}

fn record(
    report: &mut ViolationReport,
    instance_path: &JsonPointer,
    node: &SchemaNode,
    keyword: &str,
    message: impl Into<String>,
) {
    report.push(Violation::new(
        instance_path.clone(),
        node.location.clone(),
        keyword,
        message,
    ));
}

fn apply(
    report: &mut ViolationReport,
    instance_path: &JsonPointer,
    node: &SchemaNode,
    keyword: &str,
    result: RuleResult,
) {
    if !result.is_valid {
        let message = result
            .message
            .unwrap_or_else(|| format!("Value violates '{keyword}'"));
        record(report, instance_path, node, keyword, message);
    }
}

fn is_covered_member(schema: &ObjectSchema, name: &str) -> bool {
    if let Some(Keyword::Properties(entries)) = schema.keyword("properties") {
        if entries.iter().any(|(declared, _)| declared == name) {
            return true;
        }
    }
    if let Some(Keyword::PatternProperties(entries)) = schema.keyword("patternProperties") {
        if entries.iter().any(|(pattern, _)| pattern.is_match(name)) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsv_schema::SchemaLoader;
    use serde_json::json;

    fn load(schema: Value) -> Schema {
        SchemaLoader::new().load_value(&schema).expect("schema loads")
    }

    fn run(schema: Value, instance: Value) -> ViolationReport {
        let engine = ValidationEngine::new();
        engine.validate(&load(schema), &instance).expect("validation runs")
    }

    #[test]
    fn test_boolean_schemas() {
        assert!(run(json!(true), json!({"anything": [1, 2]})).is_valid());

        let report = run(json!(false), json!(null));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "schema");
    }

    #[test]
    fn test_type_failure_suppresses_remaining_keywords() {
        let report = run(json!({"type": "integer", "minimum": 5}), json!("abc"));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "type");
    }

    #[test]
    fn test_property_violations_carry_both_paths() {
        let report = run(
            json!({"properties": {"a": {"type": "integer"}}}),
            json!({"a": "x"}),
        );
        assert_eq!(report.len(), 1);
        let violation = &report.violations()[0];
        assert_eq!(violation.instance_path.to_string(), "/a");
        assert_eq!(violation.schema_path.to_string(), "/properties/a");
        assert_eq!(violation.keyword, "type");
    }

    #[test]
    fn test_required_reports_each_missing_member() {
        let schema = json!({"required": ["a", "b"]});
        assert!(run(schema.clone(), json!({"a": 1, "b": 2})).is_valid());

        let report = run(schema.clone(), json!({"a": 1}));
        assert_eq!(report.len(), 1);
        assert!(report.violations()[0].message.contains("'b'"));

        assert_eq!(run(schema, json!({})).len(), 2);
    }

    #[test]
    fn test_additional_properties_false() {
        let schema = json!({
            "properties": {"a": true},
            "additionalProperties": false
        });
        assert!(run(schema.clone(), json!({"a": 1})).is_valid());

        let report = run(schema, json!({"a": 1, "b": 2}));
        assert_eq!(report.len(), 1);
        let violation = &report.violations()[0];
        assert_eq!(violation.keyword, "additionalProperties");
        assert_eq!(violation.instance_path.to_string(), "/b");
    }

    #[test]
    fn test_pattern_properties_cover_members() {
        let schema = json!({
            "patternProperties": {"^x-": {"type": "integer"}},
            "additionalProperties": false
        });
        assert!(run(schema.clone(), json!({"x-rate": 10})).is_valid());

        let report = run(schema.clone(), json!({"x-rate": "fast"}));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].instance_path.to_string(), "/x-rate");

        let report = run(schema, json!({"other": 1}));
        assert_eq!(report.violations()[0].keyword, "additionalProperties");
    }

    #[test]
    fn test_tuple_items_and_additional_items() {
        let schema = json!({
            "items": [{"type": "integer"}, {"type": "string"}],
            "additionalItems": false
        });
        assert!(run(schema.clone(), json!([1, "a"])).is_valid());

        let report = run(schema.clone(), json!([1, "a", true]));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "additionalItems");

        let report = run(schema, json!(["x", "a"]));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].instance_path.to_string(), "/0");
    }

    #[test]
    fn test_uniform_items_validate_each_element() {
        let schema = json!({"items": {"type": "integer"}});
        assert!(run(schema.clone(), json!([1, 2, 3])).is_valid());

        let report = run(schema, json!([1, "x", 3.5]));
        assert_eq!(report.len(), 2);
        assert_eq!(report.violations()[0].instance_path.to_string(), "/1");
        assert_eq!(report.violations()[1].instance_path.to_string(), "/2");
    }

    #[test]
    fn test_any_of_reports_summary_then_branch_details() {
        let schema = json!({"anyOf": [{"type": "integer"}, {"type": "boolean"}]});
        assert!(run(schema.clone(), json!(true)).is_valid());

        let report = run(schema, json!("x"));
        assert_eq!(report.len(), 3);
        assert_eq!(report.violations()[0].keyword, "anyOf");
        assert_eq!(report.violations()[1].keyword, "type");
        assert_eq!(report.violations()[2].keyword, "type");
    }

    #[test]
    fn test_one_of_distinguishes_none_from_several() {
        let none_schema = json!({"oneOf": [{"type": "integer"}, {"type": "string"}]});
        let report = run(none_schema, json!(null));
        assert_eq!(report.violations()[0].keyword, "oneOf");
        assert!(report.violations()[0].message.contains("none of the 2"));
        assert!(report.len() > 1);

        let several_schema = json!({"oneOf": [{"type": "integer"}, {"minimum": 0}]});
        let report = run(several_schema, json!(1));
        assert_eq!(report.len(), 1);
        assert!(report.violations()[0].message.contains("alternatives 0, 1"));
    }

    #[test]
    fn test_not_keyword() {
        let schema = json!({"not": {"type": "string"}});
        assert!(run(schema.clone(), json!(5)).is_valid());

        let report = run(schema, json!("x"));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "not");
    }

    #[test]
    fn test_contains_requires_one_match() {
        let schema = json!({"contains": {"type": "integer"}});
        assert!(run(schema.clone(), json!(["a", 2])).is_valid());
        assert!(!run(schema.clone(), json!(["a", "b"])).is_valid());
        assert!(!run(schema, json!([])).is_valid());
    }

    #[test]
    fn test_dependencies_presence_form() {
        let schema = json!({"dependencies": {"credit": ["limit"]}});
        assert!(run(schema.clone(), json!({"credit": 1, "limit": 2})).is_valid());
        assert!(run(schema.clone(), json!({"limit": 2})).is_valid());

        let report = run(schema, json!({"credit": 1}));
        assert_eq!(report.len(), 1);
        assert_eq!(
            report.violations()[0].message,
            "Member 'credit' requires member 'limit'"
        );
    }

    #[test]
    fn test_dependencies_schema_form() {
        let schema = json!({"dependencies": {"credit": {"required": ["limit"]}}});
        let report = run(schema, json!({"credit": 1}));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "required");
    }

    #[test]
    fn test_property_names() {
        let schema = json!({"propertyNames": {"maxLength": 3}});
        assert!(run(schema.clone(), json!({"abc": 1})).is_valid());

        let report = run(schema, json!({"abcd": 1}));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "propertyNames");
        assert!(report.violations()[0].message.contains("'abcd'"));
    }

    #[test]
    fn test_references_hop_through_definitions() {
        let schema = json!({
            "definitions": {
                "positive": {"type": "integer", "exclusiveMinimum": 0}
            },
            "$ref": "#/definitions/positive"
        });
        assert!(run(schema.clone(), json!(5)).is_valid());

        let report = run(schema, json!(0));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "exclusiveMinimum");
    }

    #[test]
    fn test_cyclic_schema_hits_the_depth_limit() {
        let report = run(json!({"$ref": "#"}), json!(1));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "maxDepth");
    }

    #[test]
    fn test_depth_limit_is_configurable() {
        let config = ValidationConfig {
            max_depth: 2,
            ..Default::default()
        };
        let engine = ValidationEngine::with_config(config);
        let schema = load(json!({"items": {"items": {"items": {"type": "integer"}}}}));

        let report = engine.validate(&schema, &json!([[[1]]])).expect("runs");
        assert_eq!(report.violations()[0].keyword, "maxDepth");
    }

    #[test]
    fn test_all_of_merges_branch_violations() {
        let schema = json!({"allOf": [{"minimum": 10}, {"maximum": 3}]});
        let report = run(schema, json!(5));
        assert_eq!(report.len(), 2);
        assert_eq!(report.violations()[0].keyword, "minimum");
        assert_eq!(report.violations()[1].keyword, "maximum");
    }

    #[test]
    fn test_all_of_reports_only_the_failing_branch() {
        let schema = json!({"allOf": [{"minimum": 0}, {"maximum": 10}]});
        assert!(run(schema.clone(), json!(5)).is_valid());

        let report = run(schema, json!(15));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "maximum");
    }

    #[test]
    fn test_keywords_apply_only_to_their_kind() {
        let schema = json!({"minLength": 3, "minimum": 10, "minItems": 2});

        let report = run(schema.clone(), json!(5));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "minimum");

        let report = run(schema.clone(), json!("ab"));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "minLength");

        let report = run(schema, json!([1]));
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "minItems");
    }

    #[test]
    fn test_format_violations_and_strict_mode() {
        let schema = json!({"format": "ipv4"});
        assert!(run(schema.clone(), json!("10.0.0.1")).is_valid());
        assert!(!run(schema, json!("999.0.0.1")).is_valid());

        let unknown = json!({"format": "zipcode"});
        assert!(run(unknown.clone(), json!("anything")).is_valid());

        let strict = ValidationEngine::with_config(ValidationConfig {
            strict_formats: true,
            ..Default::default()
        });
        let report = strict
            .validate(&load(unknown), &json!("anything"))
            .expect("runs");
        assert_eq!(report.len(), 1);
        assert!(report.violations()[0].message.contains("zipcode"));
    }

    #[test]
    fn test_enum_and_const() {
        let schema = json!({"enum": [1, "a", [2]]});
        assert!(run(schema.clone(), json!([2])).is_valid());
        assert!(!run(schema, json!([3])).is_valid());

        let schema = json!({"const": {"a": 1}});
        assert!(run(schema.clone(), json!({"a": 1.0})).is_valid());
        assert!(!run(schema, json!({"a": 2})).is_valid());
    }

    #[test]
    fn test_is_valid_shortcut() {
        let engine = ValidationEngine::new();
        let schema = load(json!({"type": "integer"}));
        assert!(engine.is_valid(&schema, &json!(1)).expect("runs"));
        assert!(!engine.is_valid(&schema, &json!("x")).expect("runs"));
    }
}
