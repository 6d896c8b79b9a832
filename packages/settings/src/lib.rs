// ABOUTME: Administrator-overridable system settings
// ABOUTME: Typed setting records with SQLite storage and override resolution

pub mod overlay;
pub mod storage;
pub mod typed;
pub mod types;
pub mod validation;

pub use overlay::{ResolvedSetting, SettingDefault, SettingsOverlay, ValueSource};
pub use storage::SettingsStorage;
pub use typed::{decode_value, DecodeError, TypedValue};
pub use types::*;
pub use validation::{validate_key, validate_value, ValidationError};
