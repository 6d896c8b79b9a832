// ABOUTME: Effective setting resolution
// ABOUTME: Stored settings override environment variables, which override static defaults

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use sysconf_storage::StorageError;

use crate::storage::SettingsStorage;
use crate::typed::{decode_value, TypedValue};
use crate::types::ValueType;

/// Where an effective value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Database,
    Environment,
    Default,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueSource::Database => "database",
            ValueSource::Environment => "environment",
            ValueSource::Default => "default",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSetting {
    pub key: String,
    pub value: Option<TypedValue>,
    pub source: ValueSource,
}

/// A static default that stored settings may override
#[derive(Debug, Clone, PartialEq)]
pub struct SettingDefault {
    pub key: String,
    pub value_type: ValueType,
    pub default: Option<String>,
    pub env_var: Option<String>,
}

impl SettingDefault {
    pub fn new(key: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            key: key.into(),
            value_type,
            default: None,
            env_var: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_env(mut self, env_var: impl Into<String>) -> Self {
        self.env_var = Some(env_var.into());
        self
    }
}

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Resolves effective values: a stored setting with a value wins, then the
/// registered environment variable, then the static default
#[derive(Clone)]
pub struct SettingsOverlay {
    storage: SettingsStorage,
    defaults: BTreeMap<String, SettingDefault>,
    env: EnvLookup,
}

impl SettingsOverlay {
    pub fn new(storage: SettingsStorage, defaults: impl IntoIterator<Item = SettingDefault>) -> Self {
        Self::with_env_lookup(storage, defaults, |name| std::env::var(name).ok())
    }

    /// Like [`SettingsOverlay::new`] but reads environment variables through `lookup`
    pub fn with_env_lookup<F>(
        storage: SettingsStorage,
        defaults: impl IntoIterator<Item = SettingDefault>,
        lookup: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        let defaults = defaults
            .into_iter()
            .map(|d| (d.key.clone(), d))
            .collect();

        Self {
            storage,
            defaults,
            env: Arc::new(lookup),
        }
    }

    pub fn defaults(&self) -> impl Iterator<Item = &SettingDefault> {
        self.defaults.values()
    }

    /// Effective value for `key`, or `None` when it is neither stored nor registered
    pub async fn resolve(&self, key: &str) -> Result<Option<ResolvedSetting>, StorageError> {
        let stored = self.storage.get(key).await?;

        if let Some(setting) = &stored {
            if setting.value.is_some() {
                return Ok(Some(ResolvedSetting {
                    key: key.to_string(),
                    value: setting.typed_value()?,
                    source: ValueSource::Database,
                }));
            }
        }

        let Some(default) = self.defaults.get(key) else {
            // Stored without a value and nothing to fall back to
            return Ok(stored.map(|_| ResolvedSetting {
                key: key.to_string(),
                value: None,
                source: ValueSource::Database,
            }));
        };

        if let Some(raw) = default.env_var.as_deref().and_then(|name| (self.env)(name)) {
            return Ok(Some(ResolvedSetting {
                key: key.to_string(),
                value: decode_value(Some(&raw), default.value_type.as_str())?,
                source: ValueSource::Environment,
            }));
        }

        Ok(Some(ResolvedSetting {
            key: key.to_string(),
            value: decode_value(default.default.as_deref(), default.value_type.as_str())?,
            source: ValueSource::Default,
        }))
    }

    /// Resolve every registered default and every stored key, ordered by key
    pub async fn resolve_all(&self) -> Result<Vec<ResolvedSetting>, StorageError> {
        let mut keys: BTreeSet<String> = self.defaults.keys().cloned().collect();
        keys.extend(self.storage.list().await?.into_iter().map(|s| s.key));

        let mut resolved = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(setting) = self.resolve(&key).await? {
                resolved.push(setting);
            }
        }

        Ok(resolved)
    }
}
