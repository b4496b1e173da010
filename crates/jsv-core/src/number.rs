//! Comparison helpers over JSON numbers.
//!
//! Schema comparisons work on mathematical value, so `1`, `1.0`, and `1e0`
//! denote the same number regardless of lexical form. Exact 64-bit paths
//! keep large integers precise; mixed forms fall back to `f64`.

use std::cmp::Ordering;

use serde_json::Number;

/// Compare two JSON numbers by mathematical value.
#[must_use]
pub fn compare(left: &Number, right: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (left.as_u64(), right.as_u64()) {
        return a.cmp(&b);
    }
    as_comparable_f64(left).total_cmp(&as_comparable_f64(right))
}

/// True when both numbers denote the same mathematical value.
#[must_use]
pub fn equal(left: &Number, right: &Number) -> bool {
    compare(left, right) == Ordering::Equal
}

/// True when `value` is an integer multiple of `divisor`.
///
/// A zero divisor never matches. Loading rejects `"multipleOf": 0`, so that
/// case is only reachable through hand-built keywords.
#[must_use]
pub fn is_multiple_of(value: &Number, divisor: &Number) -> bool {
    if let (Some(v), Some(d)) = (value.as_i64(), divisor.as_i64()) {
        if d == 0 {
            return false;
        }
        return v % d == 0;
    }
    if let (Some(v), Some(d)) = (value.as_u64(), divisor.as_u64()) {
        if d == 0 {
            return false;
        }
        return v % d == 0;
    }
    let v = as_comparable_f64(value);
    let d = as_comparable_f64(divisor);
    if d == 0.0 || !v.is_finite() || !d.is_finite() {
        return false;
    }
    let quotient = v / d;
    (quotient - quotient.round()).abs() <= f64::EPSILON * quotient.abs().max(1.0)
}

/// Normalize for float comparison; `-0.0` maps to `0.0` so both zero
/// encodings compare equal under `total_cmp`.
fn as_comparable_f64(number: &Number) -> f64 {
    let value = number.as_f64().unwrap_or(f64::NAN);
    if value == 0.0 { 0.0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn number(value: Value) -> Number {
        match value {
            Value::Number(number) => number,
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn compares_across_lexical_forms() {
        assert_eq!(compare(&number(json!(1)), &number(json!(1.0))), Ordering::Equal);
        assert_eq!(compare(&number(json!(2)), &number(json!(1.5))), Ordering::Greater);
        assert_eq!(compare(&number(json!(1.5)), &number(json!(2))), Ordering::Less);
    }

    #[test]
    fn compares_large_integers_exactly() {
        let above_f64_precision = number(json!(9_007_199_254_740_993_i64));
        let below = number(json!(9_007_199_254_740_992_i64));
        assert_eq!(compare(&above_f64_precision, &below), Ordering::Greater);
    }

    #[test]
    fn compares_mixed_signed_and_unsigned_ranges() {
        let negative = number(json!(-1));
        let huge = number(json!(18_446_744_073_709_551_615_u64));
        assert_eq!(compare(&negative, &huge), Ordering::Less);
        assert_eq!(compare(&huge, &negative), Ordering::Greater);
    }

    #[test]
    fn zero_encodings_are_equal() {
        assert!(equal(&number(json!(0)), &number(json!(-0.0))));
        assert!(equal(&number(json!(0.0)), &number(json!(0))));
    }

    #[test]
    fn multiples_cover_integer_and_float_divisors() {
        assert!(is_multiple_of(&number(json!(10)), &number(json!(5))));
        assert!(!is_multiple_of(&number(json!(10)), &number(json!(4))));
        assert!(is_multiple_of(&number(json!(1.5)), &number(json!(0.5))));
        assert!(is_multiple_of(&number(json!(4)), &number(json!(2.0))));
        assert!(!is_multiple_of(&number(json!(4.5)), &number(json!(2))));
    }

    #[test]
    fn zero_divisor_never_matches() {
        assert!(!is_multiple_of(&number(json!(3)), &number(json!(0))));
        assert!(!is_multiple_of(&number(json!(0)), &number(json!(0.0))));
    }
}
