use crate::kernel::Kernel;
use crate::kernel::error::Result;
use crate::plugin_system::dependency::PluginDependency;

/// Core plugin trait
///
/// A plugin's identity is its name: the kernel rejects empty and duplicate
/// names at registration.
pub trait Plugin: Send + Sync {
    /// Get the name of the plugin
    fn name(&self) -> &str;

    /// Get the plugin version (semver)
    fn version(&self) -> &str {
        "0.1.0"
    }

    /// Plugins that must be initialized before this one
    fn dependencies(&self) -> Vec<PluginDependency> {
        Vec::new()
    }

    /// Called once during bootstrap, before any lifecycle event fires
    fn init(&self, kernel: &mut Kernel) -> Result<()>;
}
