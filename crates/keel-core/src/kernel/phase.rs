use std::fmt;

use crate::event::LifecycleEvent;

/// One step of the bootstrap pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootstrapPhase {
    RolesDecode,
    PluginInit,
    ConfigurationEvent,
    DatabaseInit,
    HttpClientInit,
    BindMiddlewaresEvent,
    BindRoutesEvent,
    SetResponseFormatsEvent,
    SetTemplateFunctionsEvent,
    TemplateLoad,
    RendererAttach,
    BootstrapEvent,
}

/// The bootstrap pipeline, in execution order.
pub const BOOTSTRAP_SEQUENCE: [BootstrapPhase; 12] = [
    BootstrapPhase::RolesDecode,
    BootstrapPhase::PluginInit,
    BootstrapPhase::ConfigurationEvent,
    BootstrapPhase::DatabaseInit,
    BootstrapPhase::HttpClientInit,
    BootstrapPhase::BindMiddlewaresEvent,
    BootstrapPhase::BindRoutesEvent,
    BootstrapPhase::SetResponseFormatsEvent,
    BootstrapPhase::SetTemplateFunctionsEvent,
    BootstrapPhase::TemplateLoad,
    BootstrapPhase::RendererAttach,
    BootstrapPhase::BootstrapEvent,
];

impl BootstrapPhase {
    pub fn name(&self) -> &'static str {
        match self {
            BootstrapPhase::RolesDecode => "roles-decode",
            BootstrapPhase::PluginInit => "plugin-init",
            BootstrapPhase::ConfigurationEvent => "configuration",
            BootstrapPhase::DatabaseInit => "database-init",
            BootstrapPhase::HttpClientInit => "http-client-init",
            BootstrapPhase::BindMiddlewaresEvent => "bindMiddlewares",
            BootstrapPhase::BindRoutesEvent => "bindRoutes",
            BootstrapPhase::SetResponseFormatsEvent => "setResponseFormats",
            BootstrapPhase::SetTemplateFunctionsEvent => "setTemplateFunctions",
            BootstrapPhase::TemplateLoad => "template-load",
            BootstrapPhase::RendererAttach => "renderer-attach",
            BootstrapPhase::BootstrapEvent => "bootstrap",
        }
    }

    /// Lifecycle event fired by this phase, if it is an event phase.
    pub fn event(&self) -> Option<LifecycleEvent> {
        match self {
            BootstrapPhase::ConfigurationEvent => Some(LifecycleEvent::Configuration),
            BootstrapPhase::BindMiddlewaresEvent => Some(LifecycleEvent::BindMiddlewares),
            BootstrapPhase::BindRoutesEvent => Some(LifecycleEvent::BindRoutes),
            BootstrapPhase::SetResponseFormatsEvent => Some(LifecycleEvent::SetResponseFormats),
            BootstrapPhase::SetTemplateFunctionsEvent => {
                Some(LifecycleEvent::SetTemplateFunctions)
            }
            BootstrapPhase::BootstrapEvent => Some(LifecycleEvent::Bootstrap),
            _ => None,
        }
    }
}

impl fmt::Display for BootstrapPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
