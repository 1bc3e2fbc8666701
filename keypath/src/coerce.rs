//! Coercions from template strings to the native types the remote API expects.
//!
//! Template properties only support string leaves, so `"yes"` has to become
//! `true` and `"128"` has to become `128` before a definition is sent.

use displaydoc::Display;
use serde_json::Value;
use thiserror::Error;

const TRUE_WORDS: [&str; 4] = ["y", "yes", "true", "on"];

#[derive(Debug, Clone, PartialEq, Eq, Error, Display)]
pub enum CoerceError {
    /// Cannot convert {value} to an integer
    NotAnInteger { value: String },
}

/// Truthiness of a value: strings are matched against `y`, `yes`, `true` and
/// `on` (ignoring case), everything else follows the usual JSON truthiness.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => TRUE_WORDS.iter().any(|word| s.eq_ignore_ascii_case(word)),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

pub fn to_bool(value: Value) -> Result<Value, CoerceError> {
    Ok(Value::Bool(truthy(&value)))
}

pub fn to_int(value: Value) -> Result<Value, CoerceError> {
    let not_an_integer = |value: &Value| CoerceError::NotAnInteger {
        value: value.to_string(),
    };
    match &value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if in_i64_range(f.trunc()) => Ok(Value::from(f.trunc() as i64)),
            _ => Err(not_an_integer(&value)),
        },
        Value::Bool(b) => Ok(Value::from(i64::from(*b))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| not_an_integer(&value)),
        _ => Err(not_an_integer(&value)),
    }
}

/// `i64::MAX as f64` rounds up to 2^63, which is out of range.
fn in_i64_range(f: f64) -> bool {
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    (-BOUND..BOUND).contains(&f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn true_words_ignore_case() {
        for word in ["y", "Yes", "TRUE", "on", "oN"] {
            assert_eq!(to_bool(json!(word)), Ok(json!(true)), "{word}");
        }
    }

    #[test]
    fn other_strings_are_false() {
        for word in ["n", "no", "false", "off", "", "1", "yess"] {
            assert_eq!(to_bool(json!(word)), Ok(json!(false)), "{word}");
        }
    }

    #[test]
    fn non_strings_use_truthiness() {
        assert_eq!(to_bool(json!(true)), Ok(json!(true)));
        assert_eq!(to_bool(json!(0)), Ok(json!(false)));
        assert_eq!(to_bool(json!(2)), Ok(json!(true)));
        assert_eq!(to_bool(json!(null)), Ok(json!(false)));
        assert_eq!(to_bool(json!([])), Ok(json!(false)));
        assert_eq!(to_bool(json!({ "a": 1 })), Ok(json!(true)));
    }

    #[test]
    fn int_from_string() {
        assert_eq!(to_int(json!("128")), Ok(json!(128)));
        assert_eq!(to_int(json!(" -5 ")), Ok(json!(-5)));
    }

    #[test]
    fn int_from_numbers_and_bools() {
        assert_eq!(to_int(json!(42)), Ok(json!(42)));
        assert_eq!(to_int(json!(3.9)), Ok(json!(3)));
        assert_eq!(to_int(json!(true)), Ok(json!(1)));
    }

    #[test]
    fn malformed_int_is_an_error() {
        assert!(matches!(
            to_int(json!("twelve")),
            Err(CoerceError::NotAnInteger { .. })
        ));
        assert!(to_int(json!("1.5")).is_err());
        assert!(to_int(json!(null)).is_err());
        assert!(to_int(json!([1])).is_err());
    }

    #[test]
    fn out_of_range_float_is_an_error() {
        assert!(matches!(
            to_int(json!(1e30)),
            Err(CoerceError::NotAnInteger { .. })
        ));
        assert!(to_int(json!(-1e19)).is_err());
        assert_eq!(to_int(json!(-2.5)), Ok(json!(-2)));
        assert_eq!(to_int(json!(1e15)), Ok(json!(1_000_000_000_000_000i64)));
    }
}
