//! # Keel Plugin System Errors
//!
//! [`PluginSystemError`] covers registration conflicts, failing `init` hooks
//! (wrapped with the plugin's name) and dependency resolution.
use crate::kernel::error::Error as KernelError;
use crate::plugin_system::dependency::DependencyError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin registration error for '{plugin_id}': {message}")]
    RegistrationError { plugin_id: String, message: String },

    #[error("Plugin initialization error for '{plugin_id}': {source}")]
    InitializationError {
        plugin_id: String,
        #[source]
        source: Box<KernelError>,
    },

    #[error("Dependency resolution failed: {0}")]
    DependencyResolution(#[from] DependencyError),
}
