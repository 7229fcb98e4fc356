use std::str::FromStr;

use keel_core::kernel::Kernel;
use keel_core::kernel::error::{Error as KernelError, Result as KernelResult};
use keel_core::plugin_system::Plugin;
use tracing_subscriber::EnvFilter;

/// Output format selector (`text` or `json`)
pub const LOG_FORMAT: &str = "LOG_FORMAT";

/// Filter directives used when `RUST_LOG` is unset
pub const LOG_LEVEL: &str = "LOG_LEVEL";

pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(KernelError::configuration(
                LOG_FORMAT,
                format!("unknown log format '{other}'. Options available: text or json"),
            )),
        }
    }
}

/// Installs the global `tracing` subscriber and routes `log` records into it.
#[derive(Debug, Default)]
pub struct LoggingPlugin;

impl LoggingPlugin {
    /// Filter from `RUST_LOG`, falling back to `fallback`.
    pub fn filter(fallback: &str) -> KernelResult<EnvFilter> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(fallback).map_err(|e| {
                KernelError::configuration(LOG_LEVEL, format!("invalid filter '{fallback}': {e}"))
            }),
        }
    }

    /// Install the subscriber. Returns `false` when one was already installed.
    pub fn install(format: LogFormat, filter: EnvFilter) -> bool {
        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let installed = match format {
            LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
            LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
        };
        if installed.is_err() {
            return false;
        }

        if let Err(e) = tracing_log::LogTracer::init() {
            tracing::debug!("log bridge not installed: {}", e);
        }
        true
    }
}

impl Plugin for LoggingPlugin {
    fn name(&self) -> &str {
        "core-logging"
    }

    fn init(&self, kernel: &mut Kernel) -> KernelResult<()> {
        let config = kernel.configuration();
        let format: LogFormat = config.get(LOG_FORMAT).parse()?;
        let filter = Self::filter(&config.get_or(LOG_LEVEL, DEFAULT_LOG_LEVEL))?;

        if Self::install(format, filter) {
            log::info!("Logging initialized ({:?} output)", format);
        } else {
            log::debug!("A global subscriber is already installed, keeping it");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
