use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::event::error::EventSystemError;
use crate::event::{EventContext, EventHandler, HandlerId, LifecycleEvent};
use crate::kernel::Kernel;
use crate::kernel::error::{Error, Result};

//--------------------------------------------------
// EventBus
//--------------------------------------------------

/// Publish/subscribe dispatcher for lifecycle events.
///
/// Handlers run in subscription order. Ordering across different events is
/// dictated by the bootstrap sequence, not by the bus.
pub struct EventBus {
    handlers: HashMap<LifecycleEvent, Vec<(HandlerId, EventHandler)>>,
    next_handler_id: HandlerId,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handler_count: usize = self.handlers.values().map(|v| v.len()).sum();
        f.debug_struct("EventBus")
            .field("handler_count", &handler_count)
            .field("next_handler_id", &self.next_handler_id)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            next_handler_id: 1,
        }
    }

    /// Append a handler to the subscriber list of `event`.
    pub fn subscribe<F>(&mut self, event: LifecycleEvent, handler: F) -> HandlerId
    where
        F: Fn(&mut EventContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        let id = self.next_handler_id;
        self.next_handler_id += 1;
        let handler: EventHandler = Arc::new(handler);
        self.handlers.entry(event).or_default().push((id, handler));
        log::debug!("Subscribed handler {} to event '{}'", id, event);
        id
    }

    /// Remove a handler. Returns `false` if no handler carried that id.
    pub fn unsubscribe(&mut self, id: HandlerId) -> bool {
        let mut found = false;
        self.handlers.values_mut().for_each(|handlers| {
            let len_before = handlers.len();
            handlers.retain(|(h_id, _)| *h_id != id);
            if handlers.len() < len_before {
                found = true;
            }
        });
        found
    }

    pub fn handler_count(&self, event: LifecycleEvent) -> usize {
        self.handlers.get(&event).map_or(0, Vec::len)
    }

    /// Snapshot of the current subscriber list of `event`.
    ///
    /// Firing works on the snapshot so handlers can mutate the kernel,
    /// including its bus, while the event is in flight. Subscriptions made
    /// by a handler take effect on the next fire.
    pub fn subscribers(&self, event: LifecycleEvent) -> Subscribers {
        Subscribers {
            event,
            handlers: self.handlers.get(&event).cloned().unwrap_or_default(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

//--------------------------------------------------
// Subscribers / FireOutcome
//--------------------------------------------------

/// Detached list of handlers for one event, ready to be fired.
pub struct Subscribers {
    event: LifecycleEvent,
    handlers: Vec<(HandlerId, EventHandler)>,
}

impl Subscribers {
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run every handler against `kernel`. A failure is recorded and the
    /// remaining handlers still run.
    pub fn fire(self, kernel: &mut Kernel) -> FireOutcome {
        let mut outcome = FireOutcome {
            event: self.event,
            invoked: 0,
            failures: 0,
            first_error: None,
        };

        for (id, handler) in self.handlers {
            let mut ctx = EventContext::new(self.event, kernel);
            outcome.invoked += 1;
            if let Err(e) = handler(&mut ctx) {
                log::warn!("Handler {} of event '{}' failed: {}", id, self.event, e);
                outcome.failures += 1;
                if outcome.first_error.is_none() {
                    outcome.first_error = Some(e);
                }
            }
        }

        outcome
    }
}

/// Result of firing one event.
#[derive(Debug)]
pub struct FireOutcome {
    pub event: LifecycleEvent,
    pub invoked: usize,
    pub failures: usize,
    pub first_error: Option<Error>,
}

impl FireOutcome {
    pub fn is_success(&self) -> bool {
        self.failures == 0
    }

    /// Collapse into a `Result`, keeping the first error as the source.
    pub fn into_result(self) -> Result<()> {
        match self.first_error {
            None => Ok(()),
            Some(source) => Err(EventSystemError::HandlerFailed {
                event: self.event.name().to_string(),
                failures: self.failures,
                source: Box::new(source),
            }
            .into()),
        }
    }
}
