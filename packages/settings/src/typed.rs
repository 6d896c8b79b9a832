// ABOUTME: Typed value decoding for settings
// ABOUTME: Converts stored setting text into int, float, bool, or string on every read

use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use sysconf_storage::StorageError;
use thiserror::Error;
use tracing::debug;

use crate::types::{Setting, ValueType};

/// A decoded setting value. Absence is expressed as `Option::None` by callers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl TypedValue {
    pub fn value_type(&self) -> ValueType {
        match self {
            TypedValue::Bool(_) => ValueType::Bool,
            TypedValue::Int(_) => ValueType::Int,
            TypedValue::Float(_) => ValueType::Float,
            TypedValue::String(_) => ValueType::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

// JSON has no NaN or infinity; those floats are written as strings
// ("NaN", "inf", "-inf") so they stay distinguishable from null.
impl Serialize for TypedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypedValue::Bool(b) => serializer.serialize_bool(*b),
            TypedValue::Int(i) => serializer.serialize_i64(*i),
            TypedValue::Float(x) if x.is_finite() => serializer.serialize_f64(*x),
            TypedValue::Float(x) => serializer.serialize_str(&x.to_string()),
            TypedValue::String(s) => serializer.serialize_str(s),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Bool(b) => write!(f, "{}", b),
            TypedValue::Int(i) => write!(f, "{}", i),
            TypedValue::Float(x) => write!(f, "{}", x),
            TypedValue::String(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("Invalid integer value: {value:?}")]
    InvalidInt { value: String, source: ParseIntError },

    #[error("Invalid float value: {value:?}")]
    InvalidFloat {
        value: String,
        source: ParseFloatError,
    },
}

impl From<DecodeError> for StorageError {
    fn from(err: DecodeError) -> Self {
        StorageError::Decode(err.to_string())
    }
}

/// Drop `_` digit separators from a numeric literal.
///
/// A separator is only accepted between two ASCII digits. Any other `_`
/// (leading, trailing, doubled, or next to `.`/`e`) leaves the text as is so
/// the numeric parse rejects it.
pub(crate) fn strip_digit_separators(raw: &str) -> Cow<'_, str> {
    if !raw.contains('_') {
        return Cow::Borrowed(raw);
    }

    let bytes = raw.as_bytes();
    let separators_ok = bytes.iter().enumerate().all(|(i, b)| {
        *b != b'_'
            || (i > 0
                && i + 1 < bytes.len()
                && bytes[i - 1].is_ascii_digit()
                && bytes[i + 1].is_ascii_digit())
    });

    if separators_ok {
        Cow::Owned(raw.replace('_', ""))
    } else {
        Cow::Borrowed(raw)
    }
}

impl ValueType {
    /// Decode `raw` according to this tag.
    ///
    /// `Int` and `Float` fail on malformed input. `Bool` never fails: only
    /// "true", "1" and "yes" (any case) are true, everything else is false.
    pub fn decode(&self, raw: &str) -> Result<TypedValue, DecodeError> {
        match self {
            ValueType::Int => strip_digit_separators(raw.trim())
                .parse::<i64>()
                .map(TypedValue::Int)
                .map_err(|source| DecodeError::InvalidInt {
                    value: raw.to_string(),
                    source,
                }),
            ValueType::Float => strip_digit_separators(raw.trim())
                .parse::<f64>()
                .map(TypedValue::Float)
                .map_err(|source| DecodeError::InvalidFloat {
                    value: raw.to_string(),
                    source,
                }),
            ValueType::Bool => Ok(TypedValue::Bool(matches!(
                raw.to_lowercase().as_str(),
                "true" | "1" | "yes"
            ))),
            ValueType::String => Ok(TypedValue::String(raw.to_string())),
        }
    }
}

/// Decode a stored value using its stored tag.
///
/// An absent value decodes to `None` whatever the tag. Tags other than the
/// four known ones fall back to returning the text unchanged.
pub fn decode_value(
    value: Option<&str>,
    value_type: &str,
) -> Result<Option<TypedValue>, DecodeError> {
    let Some(raw) = value else {
        return Ok(None);
    };

    let tag = match value_type.parse::<ValueType>() {
        Ok(tag) => tag,
        Err(_) => {
            debug!(value_type, "Unrecognized value type, returning raw string");
            ValueType::String
        }
    };

    tag.decode(raw).map(Some)
}

impl Setting {
    /// Decoded view of `value`, computed fresh on every call
    pub fn typed_value(&self) -> Result<Option<TypedValue>, DecodeError> {
        decode_value(self.value.as_deref(), &self.value_type)
    }
}
