use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::kernel::error::{Error, Result};
use crate::plugin_system::dependency::DependencyError;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::Plugin;

/// Registry of statically registered plugins, kept in registration order.
pub struct PluginRegistry {
    order: Vec<String>,
    plugins: HashMap<String, Arc<dyn Plugin>>,
    initialized: HashSet<String>,
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.order)
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            plugins: HashMap::new(),
            initialized: HashSet::new(),
        }
    }

    /// Register a plugin. Empty and duplicate names are rejected.
    pub fn register_plugin(&mut self, plugin: Arc<dyn Plugin>) -> Result<()> {
        let name = plugin.name().to_string();
        if name.trim().is_empty() {
            return Err(Error::PluginSystem(PluginSystemError::RegistrationError {
                plugin_id: name,
                message: "plugin name must not be empty".to_string(),
            }));
        }
        if self.plugins.contains_key(&name) {
            return Err(Error::PluginSystem(PluginSystemError::RegistrationError {
                plugin_id: name,
                message: "a plugin with this name is already registered".to_string(),
            }));
        }

        log::debug!("Registering plugin '{}' v{}", name, plugin.version());
        self.order.push(name.clone());
        self.plugins.insert(name, plugin);
        Ok(())
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(name).cloned()
    }

    /// Plugin names in registration order
    pub fn plugin_names(&self) -> &[String] {
        &self.order
    }

    pub fn plugin_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_initialized(&self, name: &str) -> bool {
        self.initialized.contains(name)
    }

    pub fn initialized_count(&self) -> usize {
        self.initialized.len()
    }

    /// Record that `name` ran its init hook. Returns `false` if it already had.
    pub fn mark_initialized(&mut self, name: &str) -> bool {
        self.initialized.insert(name.to_string())
    }

    /// Verify every declared dependency is registered with a compatible version.
    pub fn check_dependencies(&self) -> Result<()> {
        for name in &self.order {
            let Some(plugin) = self.plugins.get(name) else {
                continue;
            };
            for dep in plugin.dependencies() {
                match self.plugins.get(&dep.plugin_name) {
                    None if dep.required => {
                        return Err(DependencyError::MissingPlugin {
                            dependent: name.clone(),
                            plugin_name: dep.plugin_name.clone(),
                        }
                        .into_kernel());
                    }
                    None => {
                        log::debug!(
                            "Optional dependency '{}' of plugin '{}' is not registered",
                            dep.plugin_name,
                            name
                        );
                    }
                    Some(found) => {
                        if !dep.is_compatible_with(found.version()) {
                            return Err(DependencyError::IncompatibleVersion {
                                plugin_name: dep.plugin_name.clone(),
                                required_range: dep.version_range.clone().unwrap_or_default(),
                                actual_version: found.version().to_string(),
                            }
                            .into_kernel());
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Order in which plugins must be initialized.
    ///
    /// Dependencies come before their dependents; otherwise registration
    /// order is preserved.
    pub fn initialization_order(&self) -> Result<Vec<Arc<dyn Plugin>>> {
        self.check_dependencies()?;

        let deps: HashMap<&str, Vec<String>> = self
            .order
            .iter()
            .filter_map(|name| {
                self.plugins.get(name).map(|plugin| {
                    let names = plugin
                        .dependencies()
                        .into_iter()
                        .map(|d| d.plugin_name)
                        .filter(|d| self.plugins.contains_key(d))
                        .collect();
                    (name.as_str(), names)
                })
            })
            .collect();

        let mut placed: HashSet<&str> = HashSet::new();
        let mut sorted: Vec<Arc<dyn Plugin>> = Vec::with_capacity(self.order.len());

        while sorted.len() < self.order.len() {
            let next = self.order.iter().find(|name| {
                !placed.contains(name.as_str())
                    && deps
                        .get(name.as_str())
                        .is_none_or(|d| d.iter().all(|dep| placed.contains(dep.as_str())))
            });

            match next {
                Some(name) => {
                    placed.insert(name.as_str());
                    if let Some(plugin) = self.plugins.get(name) {
                        sorted.push(Arc::clone(plugin));
                    }
                }
                None => {
                    let cycle: Vec<String> = self
                        .order
                        .iter()
                        .filter(|name| !placed.contains(name.as_str()))
                        .cloned()
                        .collect();
                    return Err(DependencyError::CyclicDependency(cycle).into_kernel());
                }
            }
        }

        Ok(sorted)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyError {
    fn into_kernel(self) -> Error {
        Error::PluginSystem(PluginSystemError::DependencyResolution(self))
    }
}
