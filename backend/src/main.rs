//! Service entry-point: loads settings, wires adapters, and serves the API.

mod server;

use std::sync::Arc;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
#[cfg(feature = "metrics")]
use color_eyre::eyre::WrapErr;
use color_eyre::eyre::{Result, eyre};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[cfg(not(feature = "metrics"))]
use route_optimizer::domain::ports::NoOpOptimizationMetrics;
use route_optimizer::domain::ports::OptimizationMetrics;
use route_optimizer::inbound::http::health::HealthState;
use route_optimizer::middleware::ClientRateLimiter;
#[cfg(feature = "metrics")]
use route_optimizer::outbound::metrics::PrometheusOptimizationMetrics;
use route_optimizer::settings::OptimizerSettings;

use server::{ServerConfig, build_http_state, build_routing_provider, build_storage, create_server};

#[cfg(feature = "metrics")]
fn make_metrics() -> Result<(PrometheusMetrics, Arc<dyn OptimizationMetrics>)> {
    let prometheus = PrometheusMetricsBuilder::new("route_optimizer")
        .endpoint("/metrics")
        .build()
        .map_err(|err| eyre!("failed to configure Prometheus metrics: {err}"))?;
    let metrics = PrometheusOptimizationMetrics::new(&prometheus.registry)
        .wrap_err("failed to register optimisation metrics")?;
    Ok((prometheus, Arc::new(metrics)))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = OptimizerSettings::load().map_err(|err| eyre!("failed to load settings: {err}"))?;
    settings.validate()?;

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let provider = build_routing_provider(&settings)?;
    let storage = build_storage(&settings, clock.clone()).await?;

    #[cfg(feature = "metrics")]
    let (prometheus, metrics) = make_metrics()?;
    #[cfg(not(feature = "metrics"))]
    let metrics: Arc<dyn OptimizationMetrics> = Arc::new(NoOpOptimizationMetrics);

    let rate_limiter = Arc::new(ClientRateLimiter::new(
        settings.rate_limit_policy()?,
        clock.clone(),
    ));
    let http_state = build_http_state(&settings, provider, storage, metrics, clock)?;
    let bind_addr = settings.bind_addr()?;
    let config = ServerConfig::new(
        bind_addr,
        http_state,
        rate_limiter,
        #[cfg(feature = "metrics")]
        prometheus,
    );

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "route optimizer listening");
    server.await?;
    health_state.mark_unhealthy();
    Ok(())
}
