// ABOUTME: Type definitions for system settings
// ABOUTME: Setting records, value type tags, and create/update inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Declares how a setting's stored text is decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    String,
    Int,
    Float,
    Bool,
}

impl ValueType {
    pub const ALL: [ValueType; 4] = [
        ValueType::String,
        ValueType::Int,
        ValueType::Float,
        ValueType::Bool,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown value type: {0}. Must be one of: string, int, float, bool")]
pub struct ValueTypeError(pub String);

impl FromStr for ValueType {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ValueType::String),
            "int" => Ok(ValueType::Int),
            "float" => Ok(ValueType::Float),
            "bool" => Ok(ValueType::Bool),
            _ => Err(ValueTypeError(s.to_string())),
        }
    }
}

/// A persisted setting. `value_type` holds the tag exactly as stored, so rows
/// written with an unrecognized tag still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub id: i64,
    pub key: String,
    pub value: Option<String>,
    pub value_type: String,
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl Setting {
    /// The stored tag as a [`ValueType`], or `None` if it is not one of the known tags
    pub fn parsed_value_type(&self) -> Option<ValueType> {
        self.value_type.parse().ok()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingCreateInput {
    pub key: String,
    pub value: Option<String>,
    /// Defaults to [`ValueType::String`]
    pub value_type: Option<ValueType>,
    pub description: Option<String>,
}

/// Partial update. Outer `None` leaves a field untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingUpdateInput {
    pub value: Option<Option<String>>,
    pub value_type: Option<ValueType>,
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSettingUpdate {
    pub settings: Vec<SettingUpdateItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingUpdateItem {
    pub key: String,
    pub value: Option<String>,
}
