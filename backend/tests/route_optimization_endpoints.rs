//! End-to-end HTTP coverage of the optimisation endpoints.
//!
//! Requests travel through the real JSON extractor, trace middleware,
//! optimiser and in-memory cache; only the routing provider is scripted.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use route_optimizer::Trace;
use route_optimizer::domain::ports::{
    FixtureRoutePlanRepository, OptimizationCache, RoutingProviderError,
    UnconfiguredRoutingProvider,
};
use route_optimizer::domain::{
    OptimizationPolicy, RouteId, RouteOptimizerService, RoutePlanOptimizationService,
    TRACE_ID_HEADER,
};
use route_optimizer::inbound::http::json_config;
use route_optimizer::inbound::http::optimize::optimize_route;
use route_optimizer::inbound::http::route_plans::optimize_stored_route;
use route_optimizer::inbound::http::state::{HttpState, HttpStatePorts};
use route_optimizer::outbound::cache::InMemoryOptimizationCache;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

mod support;

use support::{MutableClock, ScriptedRoutingProvider, fixed_now, plan, stops};

struct Harness {
    provider: Arc<ScriptedRoutingProvider>,
    cache: Arc<InMemoryOptimizationCache>,
    clock: Arc<MutableClock>,
    state: HttpState,
}

#[fixture]
fn harness() -> Harness {
    let clock = Arc::new(MutableClock::new(fixed_now()));
    let provider = ScriptedRoutingProvider::new(Vec::new());
    let cache = Arc::new(InMemoryOptimizationCache::new(clock.clone()));
    let optimizer = Arc::new(RouteOptimizerService::new(
        provider.clone(),
        cache.clone(),
        clock.clone(),
        OptimizationPolicy::default(),
    ));
    let route_plans = Arc::new(RoutePlanOptimizationService::new(
        Arc::new(FixtureRoutePlanRepository),
        optimizer.clone(),
        clock.clone(),
    ));
    let state = HttpState::new(HttpStatePorts {
        optimizer,
        route_plans,
    });
    Harness {
        provider,
        cache,
        clock,
        state,
    }
}

fn points(ids: &[&str]) -> Value {
    stops(ids)
        .into_iter()
        .map(|stop| {
            json!({
                "id": stop.id.as_str(),
                "latitude": stop.latitude,
                "longitude": stop.longitude,
            })
        })
        .collect()
}

async fn post(
    state: &HttpState,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config())
            .wrap(Trace)
            .service(
                web::scope("/api/v1")
                    .service(optimize_route)
                    .service(optimize_stored_route),
            ),
    )
    .await;
    let request = match body {
        Some(body) => test::TestRequest::post().uri(uri).set_json(body),
        None => test::TestRequest::post().uri(uri),
    };
    let response = test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let trace_id = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = test::read_body(response).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, trace_id, body)
}

async fn optimise(state: &HttpState, route_id: &str, ids: &[&str]) -> (StatusCode, Value) {
    let (status, _, body) = post(
        state,
        "/api/v1/routes/optimize",
        Some(json!({ "routeId": route_id, "points": points(ids) })),
    )
    .await;
    (status, body)
}

#[rstest]
#[actix_web::test]
async fn waypoints_are_reordered_and_timed(harness: Harness) {
    harness.provider.push(Ok(plan(&[1, 0], &[120, 60, 300])));

    let (status, body) = optimise(&harness.state, "r-1", &["o", "w0", "w1", "d"]).await;

    assert_eq!(status, StatusCode::OK);
    let order: Vec<&str> = body["optimizedOrder"]
        .as_array()
        .expect("order array")
        .iter()
        .filter_map(|stop| stop["id"].as_str())
        .collect();
    assert_eq!(order, ["o", "w1", "w0", "d"]);
    assert_eq!(body["optimizedOrder"][1]["sequence"], json!(2));
    assert_eq!(body["etas"], json!({ "o": 0, "w1": 120, "w0": 180, "d": 480 }));
    assert_eq!(body["totalDurationSeconds"], json!(480));
    assert_eq!(body["cached"], json!(false));
    assert_eq!(harness.provider.waypoint_counts(), vec![2]);
}

#[rstest]
#[actix_web::test]
async fn repeated_requests_inside_the_window_hit_the_cache(harness: Harness) {
    harness.provider.push(Ok(plan(&[], &[240])));

    let (_, first) = optimise(&harness.state, "r-2", &["a", "b"]).await;
    harness.clock.advance_seconds(300);
    let (status, second) = optimise(&harness.state, "r-2", &["a", "b"]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["cached"], json!(false));
    assert_eq!(second["cached"], json!(true));
    assert_eq!(second["etas"], first["etas"]);
    assert_eq!(harness.provider.call_count(), 1);
}

#[rstest]
#[actix_web::test]
async fn a_new_stop_set_for_the_same_route_is_recomputed(harness: Harness) {
    harness.provider.push(Ok(plan(&[], &[240])));
    harness.provider.push(Ok(plan(&[], &[95])));

    optimise(&harness.state, "r-3", &["a", "b"]).await;
    let (status, second) = optimise(&harness.state, "r-3", &["x", "y"]).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["cached"], json!(false));
    assert_eq!(second["optimizedOrder"][0]["id"], json!("x"));
    assert_eq!(second["etas"], json!({ "x": 0, "y": 95 }));
    assert_eq!(harness.provider.call_count(), 2);

    let (_, third) = optimise(&harness.state, "r-3", &["x", "y"]).await;
    assert_eq!(third["cached"], json!(true));
    assert_eq!(harness.provider.call_count(), 2);
}

#[rstest]
#[actix_web::test]
async fn provider_failures_are_reported_and_not_cached(harness: Harness) {
    harness.provider.push(Err(RoutingProviderError::status(
        "ZERO_RESULTS",
        "no route between stops",
    )));

    let (status, body) = optimise(&harness.state, "r-4", &["a", "b"]).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], json!("provider_error"));
    assert_eq!(body["details"]["providerStatus"], json!("ZERO_RESULTS"));
    let cached = harness
        .cache
        .get(&RouteId::new("r-4").expect("route id"))
        .await
        .expect("cache read");
    assert!(cached.is_none());
}

#[rstest]
#[actix_web::test]
async fn empty_point_lists_never_reach_the_provider(harness: Harness) {
    let (status, trace_id, body) = post(
        &harness.state,
        "/api/v1/routes/optimize",
        Some(json!({ "routeId": "r-5", "points": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("invalid_request"));
    assert_eq!(body["traceId"].as_str(), trace_id.as_deref());
    assert_eq!(harness.provider.call_count(), 0);
}

#[rstest]
#[actix_web::test]
async fn stored_routes_without_stops_are_rejected(harness: Harness) {
    let (status, _, body) = post(&harness.state, "/api/v1/routes/r-6/optimize", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("invalid_request"));
    assert_eq!(harness.provider.call_count(), 0);
}

#[actix_web::test]
async fn unconfigured_provider_is_reported_as_such() {
    let clock = Arc::new(MutableClock::new(fixed_now()));
    let optimizer = Arc::new(RouteOptimizerService::new(
        Arc::new(UnconfiguredRoutingProvider),
        Arc::new(InMemoryOptimizationCache::new(clock.clone())),
        clock.clone(),
        OptimizationPolicy::default(),
    ));
    let route_plans = Arc::new(RoutePlanOptimizationService::new(
        Arc::new(FixtureRoutePlanRepository),
        optimizer.clone(),
        clock,
    ));
    let state = HttpState::new(HttpStatePorts {
        optimizer,
        route_plans,
    });

    let (status, body) = optimise(&state, "r-7", &["a", "b"]).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], json!("provider_not_configured"));
    assert_eq!(
        body["message"],
        json!("Routing provider credentials are not configured")
    );
}
