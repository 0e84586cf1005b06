//! Route optimisation API handler.
//!
//! ```text
//! POST /api/v1/routes/optimize
//! {"routeId":"route-42","points":[{"id":"a","latitude":-19.9167,"longitude":-43.9345},...]}
//! ```
//!
//! Points are validated here before they reach the optimiser: ids must be
//! non-blank and unique, and coordinates must be in range.

use std::collections::{BTreeMap, HashSet};

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::geo::is_valid_coordinate;
use crate::domain::{
    Error, OptimizationRequest, OptimizedResult, RouteId, SequencedStop, Stop, StopId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// A stop as supplied by the caller.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoutePointPayload {
    /// Caller identifier, unique within the request.
    #[schema(example = "a")]
    pub id: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Ordering hint; ignored when optimising.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
}

/// Request body for `POST /api/v1/routes/optimize`.
///
/// Both `routeId` and `route_id` are accepted.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRouteRequest {
    /// Route identity used as the cache key.
    #[serde(alias = "route_id")]
    #[schema(example = "route-42")]
    pub route_id: String,
    /// Stops in caller order; the first and last are fixed endpoints.
    #[serde(default)]
    pub points: Vec<RoutePointPayload>,
}

/// A stop in visiting order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedStopPayload {
    /// Caller identifier.
    pub id: String,
    /// 1-based visiting position.
    #[schema(example = 1)]
    pub sequence: u32,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl From<SequencedStop> for OptimizedStopPayload {
    fn from(value: SequencedStop) -> Self {
        Self {
            id: value.id.into(),
            sequence: value.sequence,
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

/// Response body for a successful optimisation.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRouteResponse {
    /// Stops in visiting order.
    pub optimized_order: Vec<OptimizedStopPayload>,
    /// Cumulative seconds from the origin, keyed by stop id.
    pub etas: BTreeMap<String, u64>,
    /// ETA of the final stop.
    pub total_duration_seconds: u64,
    /// Total driving distance in metres.
    pub total_distance_meters: u64,
    /// Encoded overview polyline of the route.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyline: Option<String>,
    /// Whether durations account for live traffic.
    pub used_live_traffic: bool,
    /// Whether the result was served from the cache.
    pub cached: bool,
}

impl From<OptimizedResult> for OptimizeRouteResponse {
    fn from(value: OptimizedResult) -> Self {
        let cached = value.is_cached();
        Self {
            optimized_order: value.order.into_iter().map(Into::into).collect(),
            etas: value
                .etas
                .into_iter()
                .map(|(id, eta)| (String::from(id), eta))
                .collect(),
            total_duration_seconds: value.total_duration_seconds,
            total_distance_meters: value.summary.total_distance_meters,
            polyline: value.summary.polyline,
            used_live_traffic: value.summary.used_live_traffic,
            cached,
        }
    }
}

fn parse_route_id(raw: String) -> Result<RouteId, Error> {
    RouteId::new(raw).map_err(|err| {
        Error::invalid_request(err.to_string()).with_details(json!({ "field": "routeId" }))
    })
}

fn parse_point(index: usize, point: RoutePointPayload) -> Result<Stop, Error> {
    let id = StopId::new(point.id).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "id", "index": index }))
    })?;
    if !is_valid_coordinate(point.latitude, point.longitude) {
        return Err(
            Error::invalid_request(format!("stop {id} has invalid coordinates")).with_details(
                json!({
                    "index": index,
                    "latitude": point.latitude,
                    "longitude": point.longitude,
                }),
            ),
        );
    }
    let stop = Stop::new(id, point.latitude, point.longitude);
    Ok(match point.sequence {
        Some(sequence) => stop.with_sequence(sequence),
        None => stop,
    })
}

/// Validate the request body and convert it into an optimisation request.
///
/// Fewer than two points is left to the optimiser, which reports it with the
/// same `invalid_request` code.
pub(crate) fn parse_request(payload: OptimizeRouteRequest) -> Result<OptimizationRequest, Error> {
    let route_id = parse_route_id(payload.route_id)?;
    let mut seen = HashSet::with_capacity(payload.points.len());
    let mut stops = Vec::with_capacity(payload.points.len());
    for (index, point) in payload.points.into_iter().enumerate() {
        let stop = parse_point(index, point)?;
        if !seen.insert(stop.id.clone()) {
            return Err(
                Error::invalid_request(format!("duplicate stop id: {}", stop.id))
                    .with_details(json!({ "field": "id", "index": index })),
            );
        }
        stops.push(stop);
    }
    Ok(OptimizationRequest::new(route_id, stops))
}

/// Optimise the visiting order of a route's stops.
///
/// Repeated calls for the same `routeId` inside the freshness window are
/// answered from the cache with `cached: true`.
#[utoipa::path(
    post,
    path = "/api/v1/routes/optimize",
    request_body = OptimizeRouteRequest,
    responses(
        (status = 200, description = "Optimised visiting order", body = OptimizeRouteResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 429, description = "Client exceeded its request budget", body = Error),
        (status = 500, description = "Routing provider not configured or failed", body = Error)
    ),
    tags = ["routes"],
    operation_id = "optimizeRoute"
)]
#[post("/routes/optimize")]
pub async fn optimize_route(
    state: web::Data<HttpState>,
    payload: web::Json<OptimizeRouteRequest>,
) -> ApiResult<HttpResponse> {
    let request = parse_request(payload.into_inner())?;
    let route_id = request.route_id.clone();
    let result = state.optimizer.optimize(request).await?;
    info!(
        route_id = %route_id,
        stops = result.order.len(),
        cached = result.is_cached(),
        "route optimised"
    );
    Ok(HttpResponse::Ok().json(OptimizeRouteResponse::from(result)))
}

#[cfg(test)]
#[path = "optimize_tests.rs"]
mod tests;
