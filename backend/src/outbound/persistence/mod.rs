//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Provides the optimisation cache table and the route plan table behind
//! their domain ports, with async access through `diesel-async` and `bb8`.
//!
//! - **Thin adapters**: implementations only translate between Diesel rows
//!   and domain types.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//!
//! # Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # async fn example() -> Result<(), route_optimizer::outbound::persistence::PoolError> {
//! use route_optimizer::outbound::persistence::{DbPool, DieselOptimizationCache, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/routes")).await?;
//! let cache = DieselOptimizationCache::new(pool, Arc::new(mockable::DefaultClock));
//! # let _ = cache;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_optimization_cache;
mod diesel_route_plan_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_optimization_cache::DieselOptimizationCache;
pub use diesel_route_plan_repository::DieselRoutePlanRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
