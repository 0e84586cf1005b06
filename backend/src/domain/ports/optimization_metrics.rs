//! Domain port surface for recording optimisation cache and provider outcomes.
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording metrics.
    pub enum OptimizationMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "optimisation metrics exporter failed: {message}",
    }
}

/// Recorder for optimisation outcomes. Failures never fail a request.
#[async_trait]
pub trait OptimizationMetrics: Send + Sync {
    /// Record a result served from a fresh cache entry.
    async fn record_cache_hit(&self) -> Result<(), OptimizationMetricsError>;

    /// Record a missing or stale cache entry.
    async fn record_cache_miss(&self) -> Result<(), OptimizationMetricsError>;

    /// Record a failed provider call.
    async fn record_provider_failure(&self) -> Result<(), OptimizationMetricsError>;
}

/// Metrics recorder that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpOptimizationMetrics;

#[async_trait]
impl OptimizationMetrics for NoOpOptimizationMetrics {
    async fn record_cache_hit(&self) -> Result<(), OptimizationMetricsError> {
        Ok(())
    }

    async fn record_cache_miss(&self) -> Result<(), OptimizationMetricsError> {
        Ok(())
    }

    async fn record_provider_failure(&self) -> Result<(), OptimizationMetricsError> {
        Ok(())
    }
}
