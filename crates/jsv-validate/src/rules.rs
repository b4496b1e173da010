//! Keyword validation rules
//!
//! Each rule checks one keyword against an already-typed slice of the
//! instance and reports the outcome as a [`RuleResult`]. Rules never
//! recurse into subschemas; the engine owns traversal and gating.

use std::cmp::Ordering;

use jsv_core::{JsonKind, json_equal, number};
use jsv_schema::{Pattern, TypeSet};
use serde_json::{Number, Value};

/// Validation rule result
#[derive(Debug, Clone)]
pub struct RuleResult {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl RuleResult {
    #[must_use]
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

/// Validate the `type` keyword
#[must_use]
pub fn validate_type(expected: &TypeSet, instance: &Value) -> RuleResult {
    if expected.matches(instance) {
        RuleResult::valid()
    } else {
        RuleResult::invalid(format!(
            "Expected {}, found {}",
            expected,
            JsonKind::of(instance)
        ))
    }
}

/// Validate the `enum` keyword
#[must_use]
pub fn validate_enum(permitted: &[Value], instance: &Value) -> RuleResult {
    if permitted
        .iter()
        .any(|candidate| json_equal(candidate, instance))
    {
        RuleResult::valid()
    } else {
        RuleResult::invalid(format!(
            "Value is not one of the {} permitted values",
            permitted.len()
        ))
    }
}

/// Validate the `const` keyword
#[must_use]
pub fn validate_const(expected: &Value, instance: &Value) -> RuleResult {
    if json_equal(expected, instance) {
        RuleResult::valid()
    } else {
        RuleResult::invalid("Value does not equal the required constant")
    }
}

/// Validate the `multipleOf` keyword
#[must_use]
pub fn validate_multiple_of(divisor: &Number, value: &Number) -> RuleResult {
    if number::is_multiple_of(value, divisor) {
        RuleResult::valid()
    } else {
        RuleResult::invalid(format!("Value {value} is not a multiple of {divisor}"))
    }
}

/// Validate the `minimum` keyword
#[must_use]
pub fn validate_minimum(bound: &Number, value: &Number) -> RuleResult {
    if number::compare(value, bound) == Ordering::Less {
        RuleResult::invalid(format!("Value {value} is less than minimum {bound}"))
    } else {
        RuleResult::valid()
    }
}

/// Validate the `maximum` keyword
#[must_use]
pub fn validate_maximum(bound: &Number, value: &Number) -> RuleResult {
    if number::compare(value, bound) == Ordering::Greater {
        RuleResult::invalid(format!("Value {value} exceeds maximum {bound}"))
    } else {
        RuleResult::valid()
    }
}

/// Validate the `exclusiveMinimum` keyword
#[must_use]
pub fn validate_exclusive_minimum(bound: &Number, value: &Number) -> RuleResult {
    if number::compare(value, bound) == Ordering::Greater {
        RuleResult::valid()
    } else {
        RuleResult::invalid(format!(
            "Value {value} must be strictly greater than {bound}"
        ))
    }
}

/// Validate the `exclusiveMaximum` keyword
#[must_use]
pub fn validate_exclusive_maximum(bound: &Number, value: &Number) -> RuleResult {
    if number::compare(value, bound) == Ordering::Less {
        RuleResult::valid()
    } else {
        RuleResult::invalid(format!(
            "Value {value} must be strictly less than {bound}"
        ))
    }
}

/// Validate the `minLength` keyword
///
/// Length counts Unicode scalar values, not bytes.
#[must_use]
pub fn validate_min_length(minimum: u64, value: &str) -> RuleResult {
    let length = character_count(value);
    if length < minimum {
        RuleResult::invalid(format!(
            "Value length {length} is less than minimum {minimum}"
        ))
    } else {
        RuleResult::valid()
    }
}

/// Validate the `maxLength` keyword
#[must_use]
pub fn validate_max_length(maximum: u64, value: &str) -> RuleResult {
    let length = character_count(value);
    if length > maximum {
        RuleResult::invalid(format!("Value length {length} exceeds maximum {maximum}"))
    } else {
        RuleResult::valid()
    }
}

/// Validate the `pattern` keyword
#[must_use]
pub fn validate_pattern(pattern: &Pattern, value: &str) -> RuleResult {
    if pattern.is_match(value) {
        RuleResult::valid()
    } else {
        RuleResult::invalid(format!(
            "Value '{}' does not match pattern '{}'",
            value,
            pattern.source()
        ))
    }
}

/// Validate the `minItems` keyword
#[must_use]
pub fn validate_min_items(minimum: u64, count: usize) -> RuleResult {
    if (count as u64) < minimum {
        RuleResult::invalid(format!(
            "Array has {count} elements, fewer than minimum {minimum}"
        ))
    } else {
        RuleResult::valid()
    }
}

/// Validate the `maxItems` keyword
#[must_use]
pub fn validate_max_items(maximum: u64, count: usize) -> RuleResult {
    if (count as u64) > maximum {
        RuleResult::invalid(format!(
            "Array has {count} elements, more than maximum {maximum}"
        ))
    } else {
        RuleResult::valid()
    }
}

/// Validate the `uniqueItems` keyword
///
/// Reports the first duplicate pair by index.
#[must_use]
pub fn validate_unique_items(elements: &[Value]) -> RuleResult {
    for second in 1..elements.len() {
        for first in 0..second {
            if json_equal(&elements[first], &elements[second]) {
                return RuleResult::invalid(format!(
                    "Elements {first} and {second} are duplicates"
                ));
            }
        }
    }
    RuleResult::valid()
}

/// Validate the `minProperties` keyword
#[must_use]
pub fn validate_min_properties(minimum: u64, count: usize) -> RuleResult {
    if (count as u64) < minimum {
        RuleResult::invalid(format!(
            "Object has {count} members, fewer than minimum {minimum}"
        ))
    } else {
        RuleResult::valid()
    }
}

/// Validate the `maxProperties` keyword
#[must_use]
pub fn validate_max_properties(maximum: u64, count: usize) -> RuleResult {
    if (count as u64) > maximum {
        RuleResult::invalid(format!(
            "Object has {count} members, more than maximum {maximum}"
        ))
    } else {
        RuleResult::valid()
    }
}

fn character_count(value: &str) -> u64 {
    value.chars().count() as u64
}
