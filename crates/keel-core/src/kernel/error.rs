//! # Keel Kernel Errors
//!
//! Defines the error taxonomy of the bootstrap phase.
//!
//! [`Error`] wraps the typed errors of every subsystem the kernel drives
//! (plugins, events, templates) and adds the variants the kernel raises on
//! its own: missing configuration, database connection failures, resource
//! registration conflicts and lifecycle misuse. Request-time failures are
//! not represented here; see [`crate::http::RequestError`].
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::event::error::EventSystemError;
use crate::kernel::phase::BootstrapPhase;
use crate::plugin_system::error::PluginSystemError;
use crate::templates::TemplateError;

/// Error type returned by every fallible kernel operation
#[derive(Debug, ThisError)]
pub enum Error {
    /// A required configuration key is missing or holds an unusable value
    #[error("Configuration error{}: {message}", key.as_ref().map(|k| format!(" for '{k}'")).unwrap_or_default())]
    Configuration {
        key: Option<String>,
        message: String,
    },

    /// Specific, typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Event system error
    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    /// Opening a database pool failed
    #[error("Database '{name}' could not be opened: {source}")]
    Database {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// A resource could not be registered (duplicate name, unknown group)
    #[error("Resource '{name}' rejected: {message}")]
    Resource { name: String, message: String },

    /// A route is already mounted for this method and path
    #[error("Route conflict: {method} {path} is already mounted")]
    RouteConflict { method: String, path: String },

    /// Error occurring because a lifecycle step was invoked out of order
    #[error("Kernel lifecycle error during {phase}: {message}")]
    KernelLifecycleError {
        phase: BootstrapPhase,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Missing or invalid value for a configuration key.
    pub fn configuration(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Configuration {
            key: Some(key.into()),
            message: message.into(),
        }
    }

    pub fn resource(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Resource {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Name of the plugin an initialization failure originated from, if any.
    pub fn plugin_name(&self) -> Option<&str> {
        match self {
            Error::PluginSystem(PluginSystemError::InitializationError { plugin_id, .. }) => {
                Some(plugin_id.as_str())
            }
            Error::PluginSystem(PluginSystemError::RegistrationError { plugin_id, .. }) => {
                Some(plugin_id.as_str())
            }
            _ => None,
        }
    }
}
