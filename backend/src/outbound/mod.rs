//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **directions**: HTTP client for the routing provider
//! - **cache**: in-memory and Redis optimisation caches
//! - **persistence**: PostgreSQL cache and route plan tables via Diesel
//! - **metrics**: Prometheus exporters (feature-gated)
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod directions;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
