//! Diesel table definitions for the optimisation tables.
//!
//! Kept in sync with `backend/migrations` by hand.

diesel::table! {
    /// Last optimisation result per route.
    ///
    /// One row per route id; rows are overwritten, never deleted.
    route_optimization_cache (route_id) {
        /// Primary key: caller-supplied route identifier.
        route_id -> Text,
        /// Hex SHA-256 of the stop list the row was computed for.
        stops_fingerprint -> Text,
        /// Visiting order as a JSON array of sequenced stops.
        optimized_order -> Jsonb,
        /// Cumulative ETAs as a JSON object keyed by stop id.
        etas -> Jsonb,
        total_distance_meters -> Int8,
        polyline -> Nullable<Text>,
        used_live_traffic -> Bool,
        /// When the row was last written.
        cached_at -> Timestamptz,
    }
}

diesel::table! {
    /// Stored stop plan of each route.
    route_plan_stops (route_id, stop_id) {
        route_id -> Text,
        stop_id -> Text,
        latitude -> Float8,
        longitude -> Float8,
        /// 1-based visiting position.
        stop_order -> Int4,
        estimated_arrival_time -> Nullable<Timestamptz>,
    }
}
