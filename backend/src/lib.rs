//! Route stop-order optimisation service.
//!
//! The [`domain`] owns validation, the cache-aware optimiser, and the ports it
//! drives. [`outbound`] adapters implement those ports against a directions
//! API, Redis, and PostgreSQL; [`inbound`] exposes them over HTTP.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(test)]
mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
