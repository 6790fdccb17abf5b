//! Coercion of loosely typed declared values.
//!
//! Declarations come from TOML or JSON documents where operators write
//! `initial_size_mb = 512` as readily as `initial_size_mb = "512"`, so every
//! property accepts either the native type or its string spelling.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A declared property value before coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl RawValue {
    fn describe(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Coerce a size in megabytes.
///
/// Non-integers fail with [`CoreError::InvalidSize`]; integers outside the
/// `u32` range fail validation.
pub fn coerce_size_mb(property: &str, value: &RawValue) -> Result<u32> {
    let parsed = match value {
        RawValue::Integer(i) => *i,
        RawValue::Text(s) => {
            let trimmed = s.trim();
            let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);
            digits
                .parse::<i64>()
                .map_err(|_| CoreError::invalid_size(property, s.clone()))?
        }
        RawValue::Bool(_) => return Err(CoreError::invalid_size(property, value.describe())),
    };
    u32::try_from(parsed).map_err(|_| {
        CoreError::validation(format!(
            "{property} must be between 0 and {}, got {parsed}",
            u32::MAX
        ))
    })
}

/// Coerce a boolean property restricted to `true` / `false`.
pub fn coerce_flag(value: &RawValue) -> Result<bool> {
    match value {
        RawValue::Bool(b) => Ok(*b),
        RawValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(invalid_choice(value, &["true", "false"])),
        },
        RawValue::Integer(_) => Err(invalid_choice(value, &["true", "false"])),
    }
}

pub(crate) fn invalid_choice(value: &RawValue, valid: &[&str]) -> CoreError {
    CoreError::validation(format!(
        "Invalid value \"{}\". Valid values are {}.",
        value.describe(),
        valid.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_from_integer_and_text() {
        assert_eq!(coerce_size_mb("initial_size_mb", &RawValue::Integer(512)).unwrap(), 512);
        assert_eq!(coerce_size_mb("initial_size_mb", &"1024".into()).unwrap(), 1024);
        assert_eq!(coerce_size_mb("initial_size_mb", &" +16 ".into()).unwrap(), 16);
        assert_eq!(coerce_size_mb("initial_size_mb", &RawValue::Integer(0)).unwrap(), 0);
    }

    #[test]
    fn test_size_rejects_non_integers_as_type_errors() {
        for raw in [RawValue::from("12.5"), RawValue::from("big"), RawValue::Bool(true)] {
            let err = coerce_size_mb("maximum_size_mb", &raw).unwrap_err();
            assert!(matches!(err, CoreError::InvalidSize { .. }), "{raw:?}");
        }
    }

    #[test]
    fn test_size_rejects_out_of_range_as_validation() {
        let err = coerce_size_mb("initial_size_mb", &RawValue::Integer(-1)).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(err.to_string().contains("got -1"));

        let err = coerce_size_mb("initial_size_mb", &RawValue::Integer(i64::from(u32::MAX) + 1));
        assert!(err.is_err());
    }

    #[test]
    fn test_flag_values() {
        assert!(coerce_flag(&RawValue::Bool(true)).unwrap());
        assert!(coerce_flag(&"TRUE".into()).unwrap());
        assert!(!coerce_flag(&"false".into()).unwrap());

        let err = coerce_flag(&"yes".into()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value \"yes\". Valid values are true, false."
        );
        assert!(coerce_flag(&RawValue::Integer(1)).is_err());
    }

    #[test]
    fn test_raw_value_deserializes_untagged() {
        let values: Vec<RawValue> = serde_json::from_str(r#"[true, 12, "12"]"#).unwrap();
        assert_eq!(
            values,
            vec![RawValue::Bool(true), RawValue::Integer(12), RawValue::from("12")]
        );
    }
}
