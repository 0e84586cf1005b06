//! HTTP server configuration object.

use std::net::SocketAddr;
use std::sync::Arc;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use route_optimizer::inbound::http::state::HttpState;
use route_optimizer::middleware::ClientRateLimiter;

/// Everything the HTTP server needs once adapters are wired.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
    pub(crate) rate_limiter: Arc<ClientRateLimiter>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: PrometheusMetrics,
}

impl ServerConfig {
    /// Construct a server configuration around prepared handler state.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        http_state: HttpState,
        rate_limiter: Arc<ClientRateLimiter>,
        #[cfg(feature = "metrics")] prometheus: PrometheusMetrics,
    ) -> Self {
        Self {
            bind_addr,
            http_state,
            rate_limiter,
            #[cfg(feature = "metrics")]
            prometheus,
        }
    }
}
