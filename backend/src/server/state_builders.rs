//! Adapter selection for the optimisation ports.
//!
//! The cache backend follows the settings: a database enables the Diesel
//! cache and stored route plans, Redis enables a shared cache, and otherwise
//! results stay in process memory. A missing API key leaves the optimiser
//! wired to a provider that always reports itself unconfigured.

use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use mockable::Clock;
use tracing::{info, warn};

use route_optimizer::domain::ports::{
    FixtureRoutePlanRepository, OptimizationCache, OptimizationMetrics, RoutePlanRepository,
    RoutingProvider, UnconfiguredRoutingProvider,
};
use route_optimizer::domain::{RouteOptimizerService, RoutePlanOptimizationService};
use route_optimizer::inbound::http::state::{HttpState, HttpStatePorts};
use route_optimizer::outbound::cache::{InMemoryOptimizationCache, RedisOptimizationCache};
use route_optimizer::outbound::directions::{DirectionsHttpConfig, DirectionsHttpSource};
use route_optimizer::outbound::persistence::{
    DbPool, DieselOptimizationCache, DieselRoutePlanRepository, PoolConfig,
    run_pending_migrations,
};
use route_optimizer::settings::{CacheBackend, OptimizerSettings};

/// Driven adapters chosen from configuration.
pub(crate) struct StorageAdapters {
    pub(crate) cache: Arc<dyn OptimizationCache>,
    pub(crate) route_plans: Arc<dyn RoutePlanRepository>,
}

/// Build the routing provider, falling back to the unconfigured stub.
pub(crate) fn build_routing_provider(
    settings: &OptimizerSettings,
) -> Result<Arc<dyn RoutingProvider>> {
    let Some(api_key) = settings.directions_api_key() else {
        warn!("no directions API key configured; optimisation requests will fail");
        return Ok(Arc::new(UnconfiguredRoutingProvider));
    };
    let source = DirectionsHttpSource::new(DirectionsHttpConfig {
        endpoint: settings.directions_endpoint()?,
        api_key: api_key.to_owned(),
        language: settings.directions_language().to_owned(),
        timeout: settings.provider_timeout()?,
    })
    .wrap_err("failed to build directions HTTP client")?;
    Ok(Arc::new(source))
}

/// Build the cache and route plan adapters for the configured backend.
pub(crate) async fn build_storage(
    settings: &OptimizerSettings,
    clock: Arc<dyn Clock>,
) -> Result<StorageAdapters> {
    match settings.cache_backend() {
        CacheBackend::Postgres { database_url } => {
            let applied = run_pending_migrations(database_url)
                .await
                .wrap_err("failed to apply database migrations")?;
            info!(applied, "database migrations applied");
            let pool = DbPool::new(PoolConfig::new(database_url))
                .await
                .wrap_err("failed to build database pool")?;
            info!("using PostgreSQL optimisation cache and route plans");
            Ok(StorageAdapters {
                cache: Arc::new(DieselOptimizationCache::new(pool.clone(), clock)),
                route_plans: Arc::new(DieselRoutePlanRepository::new(pool)),
            })
        }
        CacheBackend::Redis {
            redis_url,
            key_prefix,
        } => {
            let cache = RedisOptimizationCache::connect(redis_url, key_prefix, clock)
                .await
                .wrap_err("failed to build redis pool")?;
            info!(key_prefix, "using Redis optimisation cache");
            Ok(StorageAdapters {
                cache: Arc::new(cache),
                route_plans: Arc::new(FixtureRoutePlanRepository),
            })
        }
        CacheBackend::Memory => {
            info!("using in-memory optimisation cache");
            Ok(StorageAdapters {
                cache: Arc::new(InMemoryOptimizationCache::new(clock)),
                route_plans: Arc::new(FixtureRoutePlanRepository),
            })
        }
    }
}

/// Assemble the services behind the HTTP handlers.
pub(crate) fn build_http_state(
    settings: &OptimizerSettings,
    provider: Arc<dyn RoutingProvider>,
    storage: StorageAdapters,
    metrics: Arc<dyn OptimizationMetrics>,
    clock: Arc<dyn Clock>,
) -> Result<HttpState> {
    let StorageAdapters { cache, route_plans } = storage;
    let optimizer = Arc::new(
        RouteOptimizerService::new(provider, cache, clock.clone(), settings.policy()?)
            .with_metrics(metrics),
    );
    let stored = Arc::new(RoutePlanOptimizationService::new(
        route_plans,
        optimizer.clone(),
        clock,
    ));
    Ok(HttpState::new(HttpStatePorts {
        optimizer,
        route_plans: stored,
    }))
}
