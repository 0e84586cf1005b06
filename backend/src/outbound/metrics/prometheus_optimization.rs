//! Prometheus adapter for optimisation outcome metrics.
//!
//! Counters are registered on the registry shared with `actix-web-prom`, so
//! they appear on the same `/metrics` endpoint as the HTTP metrics.

use async_trait::async_trait;
use prometheus::{IntCounterVec, Opts, Registry};

use crate::domain::ports::{OptimizationMetrics, OptimizationMetricsError};

const CACHE_HIT: &str = "cache_hit";
const CACHE_MISS: &str = "cache_miss";
const PROVIDER_FAILURE: &str = "provider_failure";

/// Prometheus-backed optimisation metrics recorder.
///
/// # Metric Specification
///
/// - **Name**: `route_optimizer_requests_total`
/// - **Type**: Counter
/// - **Labels**:
///   - `outcome`: `cache_hit`, `cache_miss`, or `provider_failure`
pub struct PrometheusOptimizationMetrics {
    requests_total: IntCounterVec,
}

impl PrometheusOptimizationMetrics {
    /// Create and register the counter with `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error when a metric with the same name is already
    /// registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let requests_total = IntCounterVec::new(
            Opts::new(
                "route_optimizer_requests_total",
                "Optimisation requests by cache and provider outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;
        Ok(Self { requests_total })
    }

    fn record(&self, outcome: &str) {
        self.requests_total.with_label_values(&[outcome]).inc();
    }
}

#[async_trait]
impl OptimizationMetrics for PrometheusOptimizationMetrics {
    async fn record_cache_hit(&self) -> Result<(), OptimizationMetricsError> {
        self.record(CACHE_HIT);
        Ok(())
    }

    async fn record_cache_miss(&self) -> Result<(), OptimizationMetricsError> {
        self.record(CACHE_MISS);
        Ok(())
    }

    async fn record_provider_failure(&self) -> Result<(), OptimizationMetricsError> {
        self.record(PROVIDER_FAILURE);
        Ok(())
    }
}
