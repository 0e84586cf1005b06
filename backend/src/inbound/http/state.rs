//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{RouteOptimizationCommand, StoredRouteOptimizationCommand};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub optimizer: Arc<dyn RouteOptimizationCommand>,
    pub route_plans: Arc<dyn StoredRouteOptimizationCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub optimizer: Arc<dyn RouteOptimizationCommand>,
    pub route_plans: Arc<dyn StoredRouteOptimizationCommand>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use route_optimizer::domain::ports::{
    ///     DisabledOptimizationCache, FixtureRoutePlanRepository, UnconfiguredRoutingProvider,
    /// };
    /// use route_optimizer::domain::{
    ///     OptimizationPolicy, RouteOptimizerService, RoutePlanOptimizationService,
    /// };
    /// use route_optimizer::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let optimizer = Arc::new(RouteOptimizerService::new(
    ///     Arc::new(UnconfiguredRoutingProvider),
    ///     Arc::new(DisabledOptimizationCache),
    ///     Arc::new(DefaultClock),
    ///     OptimizationPolicy::default(),
    /// ));
    /// let route_plans = Arc::new(RoutePlanOptimizationService::new(
    ///     Arc::new(FixtureRoutePlanRepository),
    ///     optimizer.clone(),
    ///     Arc::new(DefaultClock),
    /// ));
    /// let state = HttpState::new(HttpStatePorts { optimizer, route_plans });
    /// let _optimizer = state.optimizer.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            optimizer,
            route_plans,
        } = ports;
        Self {
            optimizer,
            route_plans,
        }
    }
}
