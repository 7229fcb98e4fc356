//! String key/value configuration.
//!
//! A [`Configuration`] starts as a snapshot of the process environment (or
//! empty, in tests) and can be overridden in code or merged from a flat
//! JSON, YAML or TOML file. Plugins adjust it during the `configuration`
//! lifecycle event.
use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

use crate::kernel::error::{Error, Result};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }

    fn parse(&self, data: &str) -> Result<HashMap<String, Value>> {
        match self {
            ConfigFormat::Json => serde_json::from_str(data)
                .map_err(|e| Error::Other(format!("Failed to deserialize from JSON: {}", e))),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data)
                .map_err(|e| Error::Other(format!("Failed to deserialize from YAML: {}", e))),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data)
                .map_err(|e| Error::Other(format!("Failed to deserialize from TOML: {}", e))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    values: HashMap<String, String>,
}

impl Configuration {
    /// Empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the process environment
    pub fn from_env() -> Self {
        Self {
            values: std::env::vars().collect(),
        }
    }

    /// Read a flat configuration file. Non-string scalars are stringified,
    /// nested values are kept as JSON text and nulls are dropped.
    pub fn from_file(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::configuration(
                path.display().to_string(),
                "unsupported configuration file format",
            )
        })?;
        let data = std::fs::read_to_string(path)?;
        let values = format
            .parse(&data)?
            .into_iter()
            .filter_map(|(key, value)| stringify(value).map(|v| (key, v)))
            .collect();
        Ok(Self { values })
    }

    /// Builder-style `set`
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    /// Value of `key`, or an empty string when absent
    pub fn get(&self, key: &str) -> String {
        self.values.get(key).cloned().unwrap_or_default()
    }

    /// Value of `key`, or `default` when absent or empty
    pub fn get_or(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(v) if !v.is_empty() => v.clone(),
            _ => default.to_string(),
        }
    }

    /// Integer value of `key`, or `default` when absent or unparsable
    pub fn get_i64_or(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key).map(|v| v.trim()) {
            None | Some("") => default,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!(
                    "Configuration value '{}' for '{}' is not an integer, using {}",
                    raw,
                    key,
                    default
                );
                default
            }),
        }
    }

    /// `1`, `t`, `true`, `y` and `yes` (any case) are true
    pub fn get_bool(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "t" | "true" | "y" | "yes"
            )
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` on top of `self`
    pub fn merge(&mut self, other: Configuration) {
        self.values.extend(other.values);
    }
}

fn stringify(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

// Test module declaration
#[cfg(test)]
mod tests;
