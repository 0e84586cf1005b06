//! Port interface for caching computed stop orders per route.
//!
//! The store is a last-write-wins map keyed by [`RouteId`]. It never expires
//! entries itself; freshness and stop-set identity are judged by the
//! optimiser against each entry's `cached_at` and `stops_fingerprint`.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::define_port_error;
use crate::domain::{
    OptimizedResult, ResultSource, RouteId, RouteSummary, SequencedStop, StopEtas,
    StopsFingerprint,
};

/// Last optimisation result stored for one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Route the entry belongs to.
    pub route_id: RouteId,
    /// Fingerprint of the stop list the order was computed for.
    ///
    /// Entries written before fingerprints existed decode as empty and never
    /// match a request.
    #[serde(default)]
    pub stops_fingerprint: StopsFingerprint,
    /// Stops in visiting order with 1-based sequence numbers.
    pub order: Vec<SequencedStop>,
    /// Cumulative seconds from the origin, keyed by stop id.
    pub etas: StopEtas,
    /// Distance, polyline and traffic flag reported with the order.
    #[serde(default)]
    pub summary: RouteSummary,
    /// When the entry was written.
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Snapshot `result` for `route_id`, stamped at `cached_at`.
    pub fn new(
        route_id: &RouteId,
        stops_fingerprint: &StopsFingerprint,
        result: &OptimizedResult,
        cached_at: DateTime<Utc>,
    ) -> Self {
        Self {
            route_id: route_id.clone(),
            stops_fingerprint: stops_fingerprint.clone(),
            order: result.order.clone(),
            etas: result.etas.clone(),
            summary: result.summary.clone(),
            cached_at,
        }
    }

    /// Whether the entry was computed for stops with `fingerprint`.
    pub fn matches(&self, fingerprint: &StopsFingerprint) -> bool {
        &self.stops_fingerprint == fingerprint
    }

    /// Turn the entry back into a result served from cache.
    pub fn into_result(self) -> OptimizedResult {
        let Self {
            order,
            etas,
            summary,
            ..
        } = self;
        OptimizedResult::new(order, etas, ResultSource::Cache).with_summary(summary)
    }
}

define_port_error! {
    /// Errors surfaced by the caching adapter.
    pub enum OptimizationCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "optimisation cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "optimisation cache serialisation failed: {message}",
    }
}

/// Key/value store holding the last optimisation result per route.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OptimizationCache: Send + Sync {
    /// Read the entry for `route_id`, if any.
    async fn get(&self, route_id: &RouteId) -> Result<Option<CacheEntry>, OptimizationCacheError>;

    /// Overwrite the entry for `route_id` with `result`, computed for stops
    /// fingerprinted as `stops_fingerprint`, stamping the current time as
    /// `cached_at`.
    async fn put(
        &self,
        route_id: &RouteId,
        stops_fingerprint: &StopsFingerprint,
        result: &OptimizedResult,
    ) -> Result<(), OptimizationCacheError>;
}

/// Cache that never stores anything.
///
/// Every read misses and every write is discarded, which disables caching
/// without touching the optimiser.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOptimizationCache;

#[async_trait]
impl OptimizationCache for DisabledOptimizationCache {
    async fn get(&self, _route_id: &RouteId) -> Result<Option<CacheEntry>, OptimizationCacheError> {
        Ok(None)
    }

    async fn put(
        &self,
        _route_id: &RouteId,
        _stops_fingerprint: &StopsFingerprint,
        _result: &OptimizedResult,
    ) -> Result<(), OptimizationCacheError> {
        Ok(())
    }
}
