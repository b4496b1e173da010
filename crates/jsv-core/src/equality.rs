//! Structural equality over JSON values.

use serde_json::Value;

use crate::number;

/// Structural equality with numbers compared by mathematical value.
///
/// Objects compare by member set regardless of insertion order; arrays
/// compare element-wise in order. `1` and `1.0` are equal, which is the
/// comparison `enum`, `const`, and `uniqueItems` all rely on.
#[must_use]
pub fn json_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => number::equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| json_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter().all(|(key, value)| {
                    b.get(key).is_some_and(|other| json_equal(value, other))
                })
        }
        _ => false,
    }
}
