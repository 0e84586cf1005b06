//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;
pub(crate) use state_builders::{build_http_state, build_routing_provider, build_storage};

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use route_optimizer::Trace;
#[cfg(debug_assertions)]
use route_optimizer::doc::ApiDoc;
use route_optimizer::inbound::http::health::{HealthState, live, ready};
use route_optimizer::inbound::http::json_config;
use route_optimizer::inbound::http::optimize::optimize_route;
use route_optimizer::inbound::http::route_plans::optimize_stored_route;
use route_optimizer::inbound::http::state::HttpState;
use route_optimizer::middleware::{ClientRateLimiter, RateLimit};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    rate_limiter: Arc<ClientRateLimiter>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let api = web::scope("/api/v1")
        .wrap(RateLimit::new(rate_limiter))
        .service(optimize_route)
        .service(optimize_stored_route);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(json_config())
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        http_state,
        rate_limiter,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;
    let http_state = web::Data::new(http_state);

    let server = HttpServer::new(move || {
        let app = build_app(
            server_health_state.clone(),
            http_state.clone(),
            rate_limiter.clone(),
        );

        #[cfg(feature = "metrics")]
        let app = app.wrap(prometheus.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
