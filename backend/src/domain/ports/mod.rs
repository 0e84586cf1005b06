//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod optimization_cache;
mod optimization_metrics;
mod route_optimization_command;
mod route_plan_repository;
mod routing_provider;

#[cfg(test)]
pub use optimization_cache::MockOptimizationCache;
pub use optimization_cache::{
    CacheEntry, DisabledOptimizationCache, OptimizationCache, OptimizationCacheError,
};
pub use optimization_metrics::{
    NoOpOptimizationMetrics, OptimizationMetrics, OptimizationMetricsError,
};
#[cfg(test)]
pub use route_optimization_command::{
    MockRouteOptimizationCommand, MockStoredRouteOptimizationCommand,
};
pub use route_optimization_command::{RouteOptimizationCommand, StoredRouteOptimizationCommand};
#[cfg(test)]
pub use route_plan_repository::MockRoutePlanRepository;
pub use route_plan_repository::{
    FixtureRoutePlanRepository, RoutePlanRepository, RoutePlanRepositoryError, ScheduledStop,
};
#[cfg(test)]
pub use routing_provider::MockRoutingProvider;
pub use routing_provider::{
    FixtureRoutingProvider, MAX_WAYPOINTS_EXCEEDED, RoutingPlan, RoutingProvider,
    RoutingProviderError, UnconfiguredRoutingProvider,
};
