//! Dynamic field values.
//!
//! Fields hold JSON-like values so a single validator can track text inputs,
//! checkboxes, selects and multi-selects side by side. Values are always owned
//! by the store; callers hand them over (or clone) on every write.

pub use serde_json::Value;

/// Default equality used when a rule does not supply its own comparison.
///
/// Scalars compare strictly (`1` and `1.0` differ, as do `"1"` and `1`).
/// Arrays and objects compare by their serialized form.
pub fn default_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
            serialized_eq(a, b)
        }
        _ => a == b,
    }
}

/// Compare two values by their serialized JSON text.
pub fn serialized_eq(a: &Value, b: &Value) -> bool {
    match (serde_json::to_string(a), serde_json::to_string(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Returns `true` for values a user would consider "not filled in".
///
/// Null, whitespace-only strings and empty arrays/objects are empty.
/// `false` and `0` are values, not absence.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Text representation used by length and pattern checks.
pub fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Length in characters (strings, scalars) or elements (arrays).
pub fn char_len(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        Value::String(s) => s.chars().count(),
        other => as_text(other).chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_eq_scalars_are_strict() {
        assert!(default_eq(&json!("a"), &json!("a")));
        assert!(!default_eq(&json!("1"), &json!(1)));
        assert!(!default_eq(&json!(null), &json!("")));
    }

    #[test]
    fn test_default_eq_structured_by_serialized_form() {
        assert!(default_eq(&json!({"a": 1, "b": [1, 2]}), &json!({"b": [1, 2], "a": 1})));
        assert!(!default_eq(&json!([1, 2]), &json!([2, 1])));
        assert!(!default_eq(&json!([]), &json!({})));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&json!(null)));
        assert!(is_blank(&json!("   ")));
        assert!(is_blank(&json!([])));
        assert!(!is_blank(&json!(false)));
        assert!(!is_blank(&json!(0)));
    }

    #[test]
    fn test_char_len_counts_chars_not_bytes() {
        assert_eq!(char_len(&json!("héllo")), 5);
        assert_eq!(char_len(&json!([1, 2, 3])), 3);
        assert_eq!(char_len(&json!(12345)), 5);
        assert_eq!(char_len(&json!(null)), 0);
    }
}
