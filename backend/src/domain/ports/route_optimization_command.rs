//! Driving ports exposed to inbound adapters for route optimisation.

use async_trait::async_trait;

use crate::domain::{OptimizationRequest, OptimizedResult, RouteId, RouteOptimizationError};

/// Optimise the stop order of a caller-supplied route.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RouteOptimizationCommand: Send + Sync {
    /// Compute or reuse the visiting order and ETAs for `request`.
    async fn optimize(
        &self,
        request: OptimizationRequest,
    ) -> Result<OptimizedResult, RouteOptimizationError>;
}

/// Optimise a route whose stops are already stored.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoredRouteOptimizationCommand: Send + Sync {
    /// Load the stops of `route_id`, optimise them, and reschedule the plan.
    async fn optimize_stored_route(
        &self,
        route_id: &RouteId,
    ) -> Result<OptimizedResult, RouteOptimizationError>;
}
