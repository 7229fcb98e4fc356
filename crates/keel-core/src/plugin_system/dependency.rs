use std::fmt;

use semver::{Version, VersionReq};
use thiserror::Error;

/// Represents a dependency on another plugin
#[derive(Debug, Clone)]
pub struct PluginDependency {
    /// The name of the required plugin
    pub plugin_name: String,

    /// The version range that is acceptable
    pub version_range: Option<VersionReq>,

    /// Whether this is a hard requirement or optional dependency
    pub required: bool,
}

/// Error that can occur when resolving dependencies
#[derive(Debug, Error)]
pub enum DependencyError {
    /// The required plugin was not found
    #[error("Plugin '{dependent}' requires plugin '{plugin_name}', which is not registered")]
    MissingPlugin {
        dependent: String,
        plugin_name: String,
    },

    /// The plugin was found, but the version is incompatible
    #[error("Plugin version mismatch: '{plugin_name}' requires version '{required_range}' but found '{actual_version}'")]
    IncompatibleVersion {
        plugin_name: String,
        required_range: VersionReq,
        actual_version: String,
    },

    /// Dependency cycle detected
    #[error("Circular dependency detected between: {}", .0.join(", "))]
    CyclicDependency(Vec<String>),
}

impl PluginDependency {
    /// Create a new required dependency with a specific version range
    pub fn required(plugin_name: &str, version_range: VersionReq) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            version_range: Some(version_range),
            required: true,
        }
    }

    /// Create a new required dependency with any version
    pub fn required_any(plugin_name: &str) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            version_range: None,
            required: true,
        }
    }

    /// Create a new optional dependency with any version
    pub fn optional_any(plugin_name: &str) -> Self {
        Self {
            plugin_name: plugin_name.to_string(),
            version_range: None,
            required: false,
        }
    }

    /// Check if this dependency is compatible with the given plugin version string
    pub fn is_compatible_with(&self, version_str: &str) -> bool {
        let Some(range) = &self.version_range else {
            return true;
        };
        match Version::parse(version_str) {
            Ok(v) => range.matches(&v),
            Err(e) => {
                log::warn!(
                    "Could not parse version '{}' of plugin '{}': {}",
                    version_str,
                    self.plugin_name,
                    e
                );
                false
            }
        }
    }
}

impl fmt::Display for PluginDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let requirement_type = if self.required { "Requires" } else { "Optional" };
        match &self.version_range {
            Some(range) => write!(
                f,
                "{} plugin: {} (version: {})",
                requirement_type, self.plugin_name, range
            ),
            None => write!(f, "{} plugin: {} (any version)", requirement_type, self.plugin_name),
        }
    }
}
