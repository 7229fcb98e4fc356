//! # Keel Plugin System
//!
//! Plugins are statically linked extensions registered with the kernel before
//! bootstrap. Each plugin's [`Plugin::init`] hook runs exactly once, in
//! registration order with declared dependencies initialized first, and
//! typically subscribes handlers to lifecycle events, grants permissions or
//! registers models.
//!
//! ## Submodules
//!
//! - **[`dependency`]**: declared plugin dependencies and semver ranges.
//! - **[`error`]**: [`PluginSystemError`](error::PluginSystemError).
//! - **[`registry`]**: the ordered [`PluginRegistry`].
//! - **[`traits`]**: the [`Plugin`] trait.
pub mod dependency;
pub mod error;
pub mod registry;
pub mod traits;

pub use dependency::{DependencyError, PluginDependency};
pub use error::PluginSystemError;
pub use registry::PluginRegistry;
pub use traits::Plugin;
