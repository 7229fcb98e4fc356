pub mod dispatcher;
pub mod error;

use std::fmt;
use std::sync::Arc;

use crate::kernel::Kernel;
use crate::kernel::error::Result;

/// Type for handler identifiers returned by [`EventBus::subscribe`]
pub type HandlerId = u64;

/// Named lifecycle events fired by the kernel.
///
/// Every variant except [`LifecycleEvent::Migrate`] is fired through
/// `must_trigger` during bootstrap, so a failing subscriber aborts the
/// process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Configuration overrides, right after plugin init
    Configuration,
    /// Register middlewares with [`Kernel::use_middleware`]
    BindMiddlewares,
    /// Register routes, route groups and resources
    BindRoutes,
    /// Add media-type aliases to the response format registry
    SetResponseFormats,
    /// Register template functions before templates are parsed
    SetTemplateFunctions,
    /// Final bootstrap step
    Bootstrap,
    /// Fired on demand by [`Kernel::migrate`]
    Migrate,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 7] = [
        LifecycleEvent::Configuration,
        LifecycleEvent::BindMiddlewares,
        LifecycleEvent::BindRoutes,
        LifecycleEvent::SetResponseFormats,
        LifecycleEvent::SetTemplateFunctions,
        LifecycleEvent::Bootstrap,
        LifecycleEvent::Migrate,
    ];

    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Configuration => "configuration",
            LifecycleEvent::BindMiddlewares => "bindMiddlewares",
            LifecycleEvent::BindRoutes => "bindRoutes",
            LifecycleEvent::SetResponseFormats => "setResponseFormats",
            LifecycleEvent::SetTemplateFunctions => "setTemplateFunctions",
            LifecycleEvent::Bootstrap => "bootstrap",
            LifecycleEvent::Migrate => "migrate",
        }
    }

    pub fn is_mandatory(&self) -> bool {
        !matches!(self, LifecycleEvent::Migrate)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.name() == name)
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload handed to every lifecycle handler.
pub struct EventContext<'a> {
    event: LifecycleEvent,
    kernel: &'a mut Kernel,
}

impl<'a> EventContext<'a> {
    pub fn new(event: LifecycleEvent, kernel: &'a mut Kernel) -> Self {
        Self { event, kernel }
    }

    pub fn event(&self) -> LifecycleEvent {
        self.event
    }

    pub fn kernel(&mut self) -> &mut Kernel {
        self.kernel
    }

    pub fn kernel_ref(&self) -> &Kernel {
        self.kernel
    }
}

impl fmt::Debug for EventContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventContext")
            .field("event", &self.event)
            .finish_non_exhaustive()
    }
}

/// Synchronous lifecycle handler
pub type EventHandler = Arc<dyn Fn(&mut EventContext<'_>) -> Result<()> + Send + Sync>;

/// Re-export important types
pub use dispatcher::{EventBus, FireOutcome, Subscribers};
pub use error::EventSystemError;
