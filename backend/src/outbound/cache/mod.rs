//! Optimisation cache adapters.
//!
//! Both adapters implement the `OptimizationCache` port as a last-write-wins
//! map keyed by route id. Neither applies expiry; the optimiser judges
//! freshness from the stored `cached_at`.
//!
//! - **memory**: process-local map for single-instance deployments and tests.
//! - **redis**: shared store using `bb8-redis` pooling and JSON payloads.

mod memory;
mod redis;

pub use memory::InMemoryOptimizationCache;
pub use redis::{RedisCacheError, RedisOptimizationCache, redis_cache_key};
