//! Route optimisation orchestrator.
//!
//! Validates request shape, serves fresh cache entries computed for the same
//! stops, and otherwise asks the routing provider for a waypoint order before
//! writing the reconstructed result back to the cache. Provider failures are
//! never cached.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use tracing::{debug, info, warn};

use super::optimization::{
    OptimizationRequest, OptimizedResult, ResultSource, RouteEndpoints, RouteOptimizationError,
    RouteSummary, StopsFingerprint, cumulative_etas, reconstruct_visit_order,
};
use super::ports::{
    NoOpOptimizationMetrics, OptimizationCache, OptimizationMetrics, RouteOptimizationCommand,
    RoutingProvider, RoutingProviderError,
};
use super::{RouteId, Stop};

/// Default maximum age of a cached result.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Default bound on a single provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunable cache and provider policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizationPolicy {
    /// Cached results younger than this are served without a provider call.
    pub freshness_window: Duration,
    /// Upper bound on one provider call.
    pub provider_timeout: Duration,
}

impl Default for OptimizationPolicy {
    fn default() -> Self {
        Self {
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }
}

/// Whether an entry written at `cached_at` is still fresh at `now`.
///
/// Entries stamped in the future count as fresh.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use chrono::{TimeDelta, Utc};
/// use route_optimizer::domain::is_fresh;
///
/// let now = Utc::now();
/// let window = Duration::from_secs(600);
/// assert!(is_fresh(now - TimeDelta::seconds(599), now, window));
/// assert!(!is_fresh(now - TimeDelta::seconds(600), now, window));
/// ```
pub fn is_fresh(cached_at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    match (now - cached_at).to_std() {
        Ok(age) => age < window,
        Err(_) => true,
    }
}

/// Orchestrates cache lookups and provider calls for [`RouteOptimizationCommand`].
#[derive(Clone)]
pub struct RouteOptimizerService {
    provider: Arc<dyn RoutingProvider>,
    cache: Arc<dyn OptimizationCache>,
    metrics: Arc<dyn OptimizationMetrics>,
    clock: Arc<dyn Clock>,
    policy: OptimizationPolicy,
}

impl RouteOptimizerService {
    /// Create a service with no-op metrics.
    ///
    /// ```rust
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use route_optimizer::domain::ports::{DisabledOptimizationCache, FixtureRoutingProvider};
    /// # use route_optimizer::domain::{OptimizationPolicy, RouteOptimizerService};
    /// let service = RouteOptimizerService::new(
    ///     Arc::new(FixtureRoutingProvider::default()),
    ///     Arc::new(DisabledOptimizationCache),
    ///     Arc::new(DefaultClock),
    ///     OptimizationPolicy::default(),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        provider: Arc<dyn RoutingProvider>,
        cache: Arc<dyn OptimizationCache>,
        clock: Arc<dyn Clock>,
        policy: OptimizationPolicy,
    ) -> Self {
        Self {
            provider,
            cache,
            metrics: Arc::new(NoOpOptimizationMetrics),
            clock,
            policy,
        }
    }

    /// Replace the metrics recorder.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn OptimizationMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Active policy.
    pub fn policy(&self) -> OptimizationPolicy {
        self.policy
    }

    async fn fresh_cached_result(
        &self,
        route_id: &RouteId,
        fingerprint: &StopsFingerprint,
    ) -> Option<OptimizedResult> {
        let entry = match self.cache.get(route_id).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!(route_id = %route_id, "optimisation cache miss");
                return None;
            }
            Err(error) => {
                warn!(route_id = %route_id, %error, "optimisation cache read failed; treating as miss");
                return None;
            }
        };

        if !entry.matches(fingerprint) {
            debug!(route_id = %route_id, "optimisation cache entry was computed for other stops");
            return None;
        }
        if !is_fresh(entry.cached_at, self.clock.utc(), self.policy.freshness_window) {
            debug!(route_id = %route_id, cached_at = %entry.cached_at, "optimisation cache entry is stale");
            return None;
        }

        Some(entry.into_result())
    }

    async fn call_provider(
        &self,
        route_id: &RouteId,
        endpoints: &RouteEndpoints<'_>,
    ) -> Result<OptimizedResult, RoutingProviderError> {
        info!(
            route_id = %route_id,
            waypoints = endpoints.waypoints.len(),
            "requesting waypoint order from routing provider"
        );
        let call = self.provider.compute_order(
            endpoints.origin,
            endpoints.destination,
            endpoints.waypoints,
        );
        let plan = tokio::time::timeout(self.policy.provider_timeout, call)
            .await
            .map_err(|_| {
                RoutingProviderError::timeout(format!(
                    "no response within {}ms",
                    self.policy.provider_timeout.as_millis()
                ))
            })??;

        let order = reconstruct_visit_order(endpoints, &plan)?;
        let etas = cumulative_etas(&order, &plan.leg_durations_seconds)?;
        Ok(OptimizedResult::new(order, etas, ResultSource::Provider)
            .with_summary(RouteSummary::from_plan(&plan)))
    }

    async fn store(
        &self,
        route_id: &RouteId,
        fingerprint: &StopsFingerprint,
        result: &OptimizedResult,
    ) {
        if let Err(error) = self.cache.put(route_id, fingerprint, result).await {
            warn!(route_id = %route_id, %error, "failed to cache optimisation result");
        }
    }
}

fn ensure_unique_ids(stops: &[Stop]) -> Result<(), RouteOptimizationError> {
    let mut seen = BTreeSet::new();
    match stops.iter().find(|stop| !seen.insert(&stop.id)) {
        Some(stop) => Err(RouteOptimizationError::invalid_request(format!(
            "duplicate stop id: {}",
            stop.id
        ))),
        None => Ok(()),
    }
}

#[async_trait]
impl RouteOptimizationCommand for RouteOptimizerService {
    async fn optimize(
        &self,
        request: OptimizationRequest,
    ) -> Result<OptimizedResult, RouteOptimizationError> {
        let OptimizationRequest { route_id, stops } = request;
        let endpoints = RouteEndpoints::split(&stops).ok_or_else(|| {
            RouteOptimizationError::invalid_request("at least two stops are required")
        })?;
        ensure_unique_ids(&stops)?;
        let fingerprint = StopsFingerprint::of(&stops);

        if let Some(result) = self.fresh_cached_result(&route_id, &fingerprint).await {
            debug!(route_id = %route_id, "serving optimisation result from cache");
            let _ = self.metrics.record_cache_hit().await;
            return Ok(result);
        }
        let _ = self.metrics.record_cache_miss().await;

        let result = match self.call_provider(&route_id, &endpoints).await {
            Ok(result) => result,
            Err(error) => {
                warn!(route_id = %route_id, %error, "routing provider call failed");
                let _ = self.metrics.record_provider_failure().await;
                return Err(error.into());
            }
        };

        self.store(&route_id, &fingerprint, &result).await;
        Ok(result)
    }
}

#[cfg(test)]
#[path = "route_optimizer_tests.rs"]
mod tests;
