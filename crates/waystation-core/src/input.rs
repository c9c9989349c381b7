//! Request input maps

use serde_json::{Map, Value};

/// Ordered, string-keyed input extracted from a request.
///
/// Keys keep their insertion order, so validators and error formatters see
/// fields in declaration order.
pub type Input = Map<String, Value>;

/// Nested per-field messages produced by validation.
///
/// Each value is either a list of message strings or another `FieldErrors`
/// map mirroring the shape of a nested schema.
pub type FieldErrors = Map<String, Value>;

/// Shallow merge: keys in `additions` override matching keys in `base`.
///
/// Keys only present in `base` are kept.
pub fn merge_input(mut base: Input, additions: Input) -> Input {
    for (key, value) in additions {
        base.insert(key, value);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input(value: Value) -> Input {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test input must be an object"),
        }
    }

    #[test]
    fn test_merge_overrides_matching_keys() {
        let merged = merge_input(
            input(json!({"a": 1, "b": 2})),
            input(json!({"b": 3, "c": 4})),
        );
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_merge_keeps_null_values() {
        let merged = merge_input(input(json!({"a": 1})), input(json!({"a": null})));
        assert_eq!(Value::Object(merged), json!({"a": null}));
    }
}
