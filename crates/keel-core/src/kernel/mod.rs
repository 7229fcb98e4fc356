//! # Keel Kernel
//!
//! The `kernel` module is the heart of `keel-core`. It owns every piece of
//! process-wide state (configuration, databases, plugins, resources, roles,
//! templates and route groups) and drives the bootstrap pipeline that wires
//! them together before the HTTP listener starts.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Bootstrap pipeline**: [`Kernel::bootstrap`](bootstrap::Kernel::bootstrap)
//!   walks [`BOOTSTRAP_SEQUENCE`](phase::BOOTSTRAP_SEQUENCE) in order. No phase
//!   may be skipped or reordered.
//! - **Registries**: typed models, resources, template functions and route
//!   groups, see the `registry` submodule.
//! - **Constants**: configuration keys and their defaults.
//! - **Error Handling**: the kernel [`Error`](error::Error) and `Result` alias.
pub mod bootstrap;
pub mod constants;
pub mod error;
pub mod models;
pub mod phase;
mod registry;

pub use bootstrap::{Kernel, Middleware};
pub use error::{Error, Result};
pub use models::ModelRegistry;
pub use phase::{BOOTSTRAP_SEQUENCE, BootstrapPhase};
