//! Runtime kind classification for JSON values.

use std::fmt;

use serde_json::{Number, Value};

/// The six runtime kinds a JSON value can take.
///
/// `integer` is deliberately not a kind of its own. Schema `type` checks
/// accept any number whose mathematical value is integral, so `1.0`
/// satisfies `"type": "integer"`; see [`is_integral`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonKind {
    Null,
    Boolean,
    Object,
    Array,
    Number,
    String,
}

impl JsonKind {
    /// Classify a JSON value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Keyword-facing name of the kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Number => "number",
            Self::String => "string",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// True when the number's mathematical value is an integer.
///
/// Covers exact 64-bit integers and floats without a fractional part, so
/// `1.0` and `1e2` count while `1.5` does not.
#[must_use]
pub fn is_integral(number: &Number) -> bool {
    if number.is_i64() || number.is_u64() {
        return true;
    }
    match number.as_f64() {
        Some(value) => value.is_finite() && value.fract() == 0.0,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number(value: Value) -> Number {
        match value {
            Value::Number(number) => number,
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn classifies_all_kinds() {
        assert_eq!(JsonKind::of(&json!(null)), JsonKind::Null);
        assert_eq!(JsonKind::of(&json!(true)), JsonKind::Boolean);
        assert_eq!(JsonKind::of(&json!(1.5)), JsonKind::Number);
        assert_eq!(JsonKind::of(&json!("x")), JsonKind::String);
        assert_eq!(JsonKind::of(&json!([])), JsonKind::Array);
        assert_eq!(JsonKind::of(&json!({})), JsonKind::Object);
    }

    #[test]
    fn names_match_type_keyword_values() {
        assert_eq!(JsonKind::Object.name(), "object");
        assert_eq!(JsonKind::Number.to_string(), "number");
    }

    #[test]
    fn integral_numbers_include_float_forms() {
        assert!(is_integral(&number(json!(1))));
        assert!(is_integral(&number(json!(-3))));
        assert!(is_integral(&number(json!(1.0))));
        assert!(is_integral(&number(json!(1e2))));
        assert!(!is_integral(&number(json!(1.5))));
    }
}
