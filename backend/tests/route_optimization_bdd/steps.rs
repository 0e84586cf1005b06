//! Step definitions for route optimisation BDD tests.

use super::*;
use route_optimizer::domain::ports::RoutingProviderError;
use route_optimizer::domain::StopId;
use rstest_bdd_macros::{given, then, when};

use crate::support::{plan, stops};

fn parse_list<T: std::str::FromStr>(raw: &str) -> Vec<T>
where
    T::Err: std::fmt::Debug,
{
    raw.split(',')
        .map(|item| item.trim().parse().expect("list item"))
        .collect()
}

#[given("a route optimiser backed by an in-memory cache")]
fn a_route_optimiser_backed_by_an_in_memory_cache(world: &RouteOptimizationWorld) {
    world.setup();
}

#[given("the provider plans leg durations {legs}")]
fn the_provider_plans_leg_durations(world: &RouteOptimizationWorld, legs: String) {
    let provider = world.provider.get().expect("provider should be set");
    provider.push(Ok(plan(&[], &parse_list::<u64>(&legs))));
}

#[given("the provider plans waypoint order {order} with leg durations {legs}")]
fn the_provider_plans_waypoint_order_with_leg_durations(
    world: &RouteOptimizationWorld,
    order: String,
    legs: String,
) {
    let provider = world.provider.get().expect("provider should be set");
    provider.push(Ok(plan(
        &parse_list::<usize>(&order),
        &parse_list::<u64>(&legs),
    )));
}

#[given("the provider fails with status {status}")]
fn the_provider_fails_with_status(world: &RouteOptimizationWorld, status: String) {
    let provider = world.provider.get().expect("provider should be set");
    provider.push(Err(RoutingProviderError::status(status, "no route found")));
}

#[given("route {route} has stops {ids}")]
fn route_has_stops(world: &RouteOptimizationWorld, route: String, ids: String) {
    let ids: Vec<String> = parse_list(&ids);
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    world.route_id.set(RouteId::new(route).expect("route id"));
    world.stops.set(stops(&ids));
}

#[given("an empty route {route}")]
fn an_empty_route(world: &RouteOptimizationWorld, route: String) {
    world.route_id.set(RouteId::new(route).expect("route id"));
    world.stops.set(Vec::new());
}

#[when("the route is optimised")]
fn the_route_is_optimised(world: &RouteOptimizationWorld) {
    world.optimise();
}

#[when("the stops change to {ids}")]
fn the_stops_change_to(world: &RouteOptimizationWorld, ids: String) {
    let ids: Vec<String> = parse_list(&ids);
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    world.stops.set(stops(&ids));
}

#[when("the clock advances by {seconds} seconds")]
fn the_clock_advances_by(world: &RouteOptimizationWorld, seconds: i64) {
    let clock = world.clock.get().expect("clock should be set");
    clock.advance_seconds(seconds);
}

#[then("the visit order is {ids}")]
fn the_visit_order_is(world: &RouteOptimizationWorld, ids: String) {
    let expected: Vec<String> = parse_list(&ids);
    let result = world.success();
    let actual: Vec<&str> = result.order.iter().map(|stop| stop.id.as_str()).collect();
    assert_eq!(actual, expected);
    let sequences: Vec<u32> = result.order.iter().map(|stop| stop.sequence).collect();
    assert_eq!(sequences, (1..=expected.len() as u32).collect::<Vec<_>>());
}

#[then("the estimated arrival at {stop} is {seconds} seconds")]
fn the_estimated_arrival_at_is(world: &RouteOptimizationWorld, stop: String, seconds: u64) {
    let result = world.success();
    let stop_id = StopId::new(stop).expect("stop id");
    assert_eq!(result.etas.get(&stop_id).copied(), Some(seconds));
}

#[then("the result was freshly computed")]
fn the_result_was_freshly_computed(world: &RouteOptimizationWorld) {
    assert!(!world.success().is_cached());
}

#[then("the result was served from the cache")]
fn the_result_was_served_from_the_cache(world: &RouteOptimizationWorld) {
    assert!(world.success().is_cached());
}

#[then("the provider received no waypoints")]
fn the_provider_received_no_waypoints(world: &RouteOptimizationWorld) {
    let provider = world.provider.get().expect("provider should be set");
    assert_eq!(provider.waypoint_counts(), vec![0]);
}

#[then("the provider call count is {count}")]
fn the_provider_call_count_is(world: &RouteOptimizationWorld, count: usize) {
    let provider = world.provider.get().expect("provider should be set");
    assert_eq!(provider.call_count(), count);
}

#[then("the optimisation is rejected as an invalid request")]
fn the_optimisation_is_rejected_as_an_invalid_request(world: &RouteOptimizationWorld) {
    assert!(matches!(
        world.failure(),
        RouteOptimizationError::InvalidRequest { .. }
    ));
}

#[then("the optimisation fails with provider status {status}")]
fn the_optimisation_fails_with_provider_status(world: &RouteOptimizationWorld, status: String) {
    match world.failure() {
        RouteOptimizationError::Provider(error) => {
            assert_eq!(error.provider_status(), Some(status.as_str()));
        }
        other => panic!("expected provider failure, got {other:?}"),
    }
}

#[then("the cached entry is unchanged")]
fn the_cached_entry_is_unchanged(world: &RouteOptimizationWorld) {
    let before = world
        .entry_before_last_call
        .get()
        .expect("entry snapshot should be set");
    assert!(before.is_some(), "a prior result should have been cached");
    assert_eq!(world.cached_entry(), before);
}
