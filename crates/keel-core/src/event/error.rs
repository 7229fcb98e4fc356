//! # Keel Event System Errors
//!
//! [`EventSystemError`] reports failures observed while firing lifecycle
//! events. A failing handler never stops the remaining handlers of the same
//! event; the error carries the first failure and the number of failures.
use thiserror::Error;

use crate::kernel::error::Error as KernelError;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("{failures} handler(s) of event '{event}' failed, first error: {source}")]
    HandlerFailed {
        event: String,
        failures: usize,
        #[source]
        source: Box<KernelError>,
    },
}
