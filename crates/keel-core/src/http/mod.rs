//! # Keel HTTP Surface
//!
//! Everything the kernel exposes at request time: route groups, the generic
//! CRUD resource binding, request errors and their format-aware dispatch,
//! content negotiation, the health probe and the shared outbound client.
pub mod client;
pub mod dispatcher;
pub mod error;
pub mod health;
pub mod negotiation;
pub mod resource;
pub mod router;

pub use dispatcher::{ErrorDispatcher, PageContext, dispatch_errors};
pub use error::{
    DeferredError, Disposition, ErrorEnvelope, RequestError, ValidationFieldError,
    ValidationResponse,
};
pub use negotiation::{ResponseFormat, ResponseFormats};
pub use resource::{HttpController, RequestContext, Resource};
pub use router::{Endpoint, RouteGroup, join_path};

// Test module declaration
#[cfg(test)]
mod tests;
