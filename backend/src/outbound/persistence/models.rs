//! Internal Diesel row structs.
//!
//! Never exposed to the domain; adapters convert at the boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{route_optimization_cache, route_plan_stops};

/// Row read from `route_optimization_cache`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = route_optimization_cache)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OptimizationCacheRow {
    pub route_id: String,
    pub stops_fingerprint: String,
    pub optimized_order: serde_json::Value,
    pub etas: serde_json::Value,
    pub total_distance_meters: i64,
    pub polyline: Option<String>,
    pub used_live_traffic: bool,
    pub cached_at: DateTime<Utc>,
}

/// Row written to `route_optimization_cache`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = route_optimization_cache)]
pub(crate) struct NewOptimizationCacheRow<'a> {
    pub route_id: &'a str,
    pub stops_fingerprint: &'a str,
    pub optimized_order: serde_json::Value,
    pub etas: serde_json::Value,
    pub total_distance_meters: i64,
    pub polyline: Option<&'a str>,
    pub used_live_traffic: bool,
    pub cached_at: DateTime<Utc>,
}

/// Row read from `route_plan_stops`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = route_plan_stops)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoutePlanStopRow {
    pub stop_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub stop_order: i32,
}
