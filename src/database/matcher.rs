/*!
 * Partial equality between JSON documents.
 *
 * `partial_match` is one-directional: every field named by the criteria must
 * be present in the candidate and match recursively, while fields the criteria
 * does not mention are ignored. Sequences are the exception and must be equal
 * in full.
 */

use serde_json::{Number, Value};

/// Check whether `candidate` satisfies `criteria`.
///
/// A key missing from the candidate never matches, even against a `null`
/// criteria value. Numbers compare by numeric value.
pub fn partial_match(criteria: &Value, candidate: &Value) -> bool {
    match (criteria, candidate) {
        (Value::Array(expected), Value::Array(actual)) => arrays_equal(expected, actual),
        (Value::Array(_), _) | (_, Value::Array(_)) => false,
        (Value::Object(expected), Value::Object(actual)) => expected.iter().all(|(key, value)| {
            actual
                .get(key)
                .is_some_and(|candidate_value| partial_match(value, candidate_value))
        }),
        (Value::Object(_), _) | (_, Value::Object(_)) => false,
        (expected, actual) => primitives_equal(expected, actual),
    }
}

/// Full structural equality, used for sequences and their elements
pub fn deep_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Array(a), Value::Array(b)) => arrays_equal(a, b),
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| deep_equal(value, other)))
        }
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => false,
        (a, b) => primitives_equal(a, b),
    }
}

fn arrays_equal(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(a, b)| deep_equal(a, b))
}

fn primitives_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (a, b) => a == b,
    }
}

fn numbers_equal(left: &Number, right: &Number) -> bool {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (left.as_u64(), right.as_u64()) {
        return a == b;
    }
    left.as_f64() == right.as_f64()
}
