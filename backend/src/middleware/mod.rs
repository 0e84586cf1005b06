//! Request middleware.
//!
//! Purpose: define middleware components for request lifecycle concerns such
//! as trace correlation and per-client rate limiting.

pub mod rate_limit;
pub mod trace;

pub use rate_limit::{ClientRateLimiter, RateLimit, RateLimitPolicy};
pub use trace::Trace;
