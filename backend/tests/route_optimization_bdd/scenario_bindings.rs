//! Scenario bindings for route optimisation BDD tests.

use super::*;
use rstest_bdd_macros::scenario;

#[scenario(
    path = "tests/features/route_optimization.feature",
    name = "Two-stop routes are timed leg by leg"
)]
fn two_stop_routes_are_timed_leg_by_leg(world: RouteOptimizationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/route_optimization.feature",
    name = "Intermediate stops follow the provider waypoint order"
)]
fn intermediate_stops_follow_the_provider_waypoint_order(world: RouteOptimizationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/route_optimization.feature",
    name = "Fresh results are served from the cache"
)]
fn fresh_results_are_served_from_the_cache(world: RouteOptimizationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/route_optimization.feature",
    name = "Stale results are recomputed"
)]
fn stale_results_are_recomputed(world: RouteOptimizationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/route_optimization.feature",
    name = "Routes without stops are rejected before the provider is called"
)]
fn routes_without_stops_are_rejected(world: RouteOptimizationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/route_optimization.feature",
    name = "Provider failures leave the cache untouched"
)]
fn provider_failures_leave_the_cache_untouched(world: RouteOptimizationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/route_optimization.feature",
    name = "Changed stops are recomputed inside the window"
)]
fn changed_stops_are_recomputed_inside_the_window(world: RouteOptimizationWorld) {
    drop(world);
}
