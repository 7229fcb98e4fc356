pub mod acl;
pub mod config;
pub mod database;
pub mod event;
pub mod http;
pub mod kernel;
pub mod plugin_system;
pub mod templates;
pub mod utils;

// Re-export key public types/traits for easier use by the binary and plugins
pub use acl::{Acl, Role, RoleTable};
pub use config::Configuration;
pub use database::{Database, DbEngine};
pub use event::{EventBus, EventContext, LifecycleEvent};
pub use http::{HttpController, RequestContext, RequestError, ResponseFormat, RouteGroup};
pub use kernel::Kernel;
pub use kernel::error::Error as KernelError;
pub use plugin_system::{Plugin, PluginDependency, PluginRegistry};
pub use templates::{TemplateFunctions, TemplateSet};

#[cfg(test)]
mod tests;
