//! Optimisation of stored route plans.
//!
//! ```text
//! POST /api/v1/routes/{route_id}/optimize
//! ```

use actix_web::{HttpResponse, post, web};
use serde_json::json;
use tracing::info;

use crate::domain::{Error, RouteId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::optimize::OptimizeRouteResponse;
use crate::inbound::http::state::HttpState;

/// Re-optimise the stops already stored for a route.
///
/// Freshly computed orders are written back to the plan with arrival
/// estimates; cached results leave the plan untouched.
#[utoipa::path(
    post,
    path = "/api/v1/routes/{route_id}/optimize",
    params(("route_id" = String, Path, description = "Stored route identifier")),
    responses(
        (status = 200, description = "Optimised visiting order", body = OptimizeRouteResponse),
        (status = 400, description = "Route has fewer than two usable stops", body = Error),
        (status = 429, description = "Client exceeded its request budget", body = Error),
        (status = 500, description = "Routing provider not configured or failed", body = Error),
        (status = 503, description = "Route plan storage unavailable", body = Error)
    ),
    tags = ["routes"],
    operation_id = "optimizeStoredRoute"
)]
#[post("/routes/{route_id}/optimize")]
pub async fn optimize_stored_route(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let route_id = RouteId::new(path.into_inner()).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "routeId" }))
    })?;
    let result = state.route_plans.optimize_stored_route(&route_id).await?;
    info!(
        route_id = %route_id,
        stops = result.order.len(),
        cached = result.is_cached(),
        "stored route optimised"
    );
    Ok(HttpResponse::Ok().json(OptimizeRouteResponse::from(result)))
}
