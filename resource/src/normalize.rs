use grassformation_keypath::{CoerceError, Keypath, KeypathError, to_bool, to_int};
use serde_json::Value;

use crate::descriptor::{Coercion, FieldCoercion};

impl Coercion {
    pub fn apply(self, value: Value) -> Result<Value, CoerceError> {
        match self {
            Coercion::Bool => to_bool(value),
            Coercion::Int => to_int(value),
        }
    }
}

/// Applies every coercion to a copy of `element`. Fields that are absent are
/// left alone.
pub fn normalize_element(coercions: &[FieldCoercion], element: &Value) -> Result<Value, KeypathError> {
    let mut normalized = element.clone();
    for FieldCoercion { keypath, coercion } in coercions {
        let keypath: Keypath = keypath.parse()?;
        keypath.replace(&mut normalized, |value| coercion.apply(value))?;
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COERCIONS: &[FieldCoercion] = &[
        FieldCoercion::bool("Config.Enabled"),
        FieldCoercion::int("Config.Size"),
    ];

    #[test]
    fn coerces_present_fields_only() {
        let element = json!({ "Id": "x", "Config": { "Enabled": "on" } });
        let normalized = normalize_element(COERCIONS, &element).unwrap();
        assert_eq!(normalized, json!({ "Id": "x", "Config": { "Enabled": true } }));
        assert_eq!(element["Config"]["Enabled"], json!("on"));
    }

    #[test]
    fn no_coercions_is_identity() {
        let element = json!({ "Source": "cloud", "Target": "arn", "Subject": "t/#" });
        assert_eq!(normalize_element(&[], &element).unwrap(), element);
    }

    #[test]
    fn malformed_int_fails() {
        let element = json!({ "Config": { "Size": "big" } });
        assert!(matches!(
            normalize_element(COERCIONS, &element),
            Err(KeypathError::Transform { .. })
        ));
    }
}
