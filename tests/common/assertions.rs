//! Custom assertion utilities for tests.

use odoo_connect::Record;
use serde_json::Value;

/// Assert that a result is Ok and return the inner value.
///
/// # Panics
///
/// Panics with `context` and the error if the result is `Err`.
#[allow(dead_code)]
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("{} failed: {:?}", context, e),
    }
}

/// Assert that an error message contains expected text (case-insensitive).
#[allow(dead_code)]
pub fn assert_error_contains<E: std::fmt::Display>(error: E, expected_text: &str, context: &str) {
    let error_str = error.to_string().to_lowercase();
    let expected_lower = expected_text.to_lowercase();

    assert!(
        error_str.contains(&expected_lower),
        "{}: error message should contain '{}', got: {}",
        context,
        expected_text,
        error
    );
}

/// Compare records against a JSON array, ignoring key order.
#[allow(dead_code)]
pub fn assert_records_eq(actual: &[Record], expected: Value, context: &str) {
    let actual = Value::Array(actual.iter().cloned().map(Value::Object).collect());
    assert_eq!(actual, expected, "{}: records differ", context);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assert_ok() {
        let result: Result<i32, &str> = Ok(42);
        assert_eq!(assert_ok(result, "test operation"), 42);
    }

    #[test]
    #[should_panic(expected = "test operation failed")]
    fn test_assert_ok_fails() {
        let result: Result<i32, &str> = Err("error");
        assert_ok(result, "test operation");
    }

    #[test]
    fn test_assert_records_eq_ignores_key_order() {
        let record = json!({"b": 1, "a": 2}).as_object().cloned().unwrap();
        assert_records_eq(&[record], json!([{"a": 2, "b": 1}]), "key order");
    }
}
