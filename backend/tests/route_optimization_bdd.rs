//! Behaviour-driven tests for cache-aware route optimisation.

use std::sync::Arc;

use route_optimizer::domain::ports::{CacheEntry, OptimizationCache};
use route_optimizer::domain::{
    OptimizationPolicy, OptimizationRequest, OptimizedResult, RouteId, RouteOptimizationError,
    RouteOptimizerService, Stop,
};
use route_optimizer::outbound::cache::InMemoryOptimizationCache;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

mod support;

use support::{MutableClock, ScriptedRoutingProvider, fixed_now};

#[derive(Clone)]
struct RuntimeHandle(Arc<tokio::runtime::Runtime>);

#[derive(Default, ScenarioState)]
struct RouteOptimizationWorld {
    runtime: Slot<RuntimeHandle>,
    service: Slot<Arc<RouteOptimizerService>>,
    provider: Slot<Arc<ScriptedRoutingProvider>>,
    cache: Slot<Arc<InMemoryOptimizationCache>>,
    clock: Slot<Arc<MutableClock>>,
    route_id: Slot<RouteId>,
    stops: Slot<Vec<Stop>>,
    entry_before_last_call: Slot<Option<CacheEntry>>,
    last_result: Slot<Result<OptimizedResult, RouteOptimizationError>>,
}

impl RouteOptimizationWorld {
    fn setup(&self) {
        let runtime = tokio::runtime::Runtime::new().expect("create runtime");
        let clock = Arc::new(MutableClock::new(fixed_now()));
        let provider = ScriptedRoutingProvider::new(Vec::new());
        let cache = Arc::new(InMemoryOptimizationCache::new(clock.clone()));
        let service = RouteOptimizerService::new(
            provider.clone(),
            cache.clone(),
            clock.clone(),
            OptimizationPolicy::default(),
        );

        self.runtime.set(RuntimeHandle(Arc::new(runtime)));
        self.clock.set(clock);
        self.provider.set(provider);
        self.cache.set(cache);
        self.service.set(Arc::new(service));
    }

    fn optimise(&self) {
        use route_optimizer::domain::ports::RouteOptimizationCommand;

        let runtime = self.runtime.get().expect("runtime should be set");
        let service = self.service.get().expect("service should be set");
        let cache = self.cache.get().expect("cache should be set");
        let route_id = self.route_id.get().expect("route id should be set");
        let stops = self.stops.get().unwrap_or_default();

        let (before, result) = runtime.0.block_on(async {
            let before = cache.get(&route_id).await.expect("in-memory cache read");
            let result = service
                .optimize(OptimizationRequest::new(route_id.clone(), stops))
                .await;
            (before, result)
        });

        self.entry_before_last_call.set(before);
        self.last_result.set(result);
    }

    fn cached_entry(&self) -> Option<CacheEntry> {
        let runtime = self.runtime.get().expect("runtime should be set");
        let cache = self.cache.get().expect("cache should be set");
        let route_id = self.route_id.get().expect("route id should be set");
        runtime
            .0
            .block_on(cache.get(&route_id))
            .expect("in-memory cache read")
    }

    fn success(&self) -> OptimizedResult {
        self.last_result
            .get()
            .expect("last result should be set")
            .expect("optimisation should succeed")
    }

    fn failure(&self) -> RouteOptimizationError {
        self.last_result
            .get()
            .expect("last result should be set")
            .expect_err("optimisation should fail")
    }
}

#[fixture]
fn world() -> RouteOptimizationWorld {
    RouteOptimizationWorld::default()
}

#[path = "route_optimization_bdd/steps.rs"]
mod route_optimization_steps;

#[path = "route_optimization_bdd/scenario_bindings.rs"]
mod route_optimization_scenarios;
