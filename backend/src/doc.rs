//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the optimisation and health endpoints together with
//! their request, response, and error schemas. The document backs Swagger UI
//! in debug builds and is exported by `cargo run --bin openapi-dump`.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::optimize::{
    OptimizeRouteRequest, OptimizeRouteResponse, OptimizedStopPayload, RoutePointPayload,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Route optimizer API",
        description = "Stop-order optimisation with a freshness-windowed result cache."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::optimize::optimize_route,
        crate::inbound::http::route_plans::optimize_stored_route,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        OptimizeRouteRequest,
        RoutePointPayload,
        OptimizeRouteResponse,
        OptimizedStopPayload,
        Error,
        ErrorCode
    )),
    tags(
        (name = "routes", description = "Route stop-order optimisation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
