//! PostgreSQL-backed `OptimizationCache` implementation using Diesel ORM.
//!
//! One row per route in `route_optimization_cache`, written with
//! `INSERT ... ON CONFLICT (route_id) DO UPDATE`. Each row records the stop
//! fingerprint it was computed for. Rows are never deleted;
//! stale rows are simply overwritten by the next computed result.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use mockable::Clock;

use crate::domain::ports::{CacheEntry, OptimizationCache, OptimizationCacheError};
use crate::domain::{
    OptimizedResult, RouteId, RouteSummary, SequencedStop, StopEtas, StopsFingerprint,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewOptimizationCacheRow, OptimizationCacheRow};
use super::pool::{DbPool, PoolError};
use super::schema::route_optimization_cache;

/// Diesel-backed optimisation cache.
#[derive(Clone)]
pub struct DieselOptimizationCache {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselOptimizationCache {
    /// Create a cache over `pool`, stamping rows with `clock`.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_checkout_error(error: PoolError) -> OptimizationCacheError {
    map_pool_error(error, |message| OptimizationCacheError::backend(message))
}

fn serialization_error(error: serde_json::Error) -> OptimizationCacheError {
    OptimizationCacheError::serialization(error.to_string())
}

fn map_query_error(error: diesel::result::Error) -> OptimizationCacheError {
    map_diesel_error(
        error,
        |message| OptimizationCacheError::backend(message),
        |message| OptimizationCacheError::backend(message),
    )
}

fn row_to_entry(row: OptimizationCacheRow) -> Result<CacheEntry, OptimizationCacheError> {
    let route_id = RouteId::new(row.route_id).map_err(|error| {
        OptimizationCacheError::serialization(format!("invalid route id in database: {error}"))
    })?;
    let order: Vec<SequencedStop> =
        serde_json::from_value(row.optimized_order).map_err(serialization_error)?;
    let etas: StopEtas = serde_json::from_value(row.etas).map_err(serialization_error)?;
    let total_distance_meters = u64::try_from(row.total_distance_meters).map_err(|_| {
        OptimizationCacheError::serialization(format!(
            "negative route distance in database: {}",
            row.total_distance_meters
        ))
    })?;
    Ok(CacheEntry {
        route_id,
        stops_fingerprint: StopsFingerprint::from_stored(row.stops_fingerprint),
        order,
        etas,
        summary: RouteSummary {
            total_distance_meters,
            polyline: row.polyline,
            used_live_traffic: row.used_live_traffic,
        },
        cached_at: row.cached_at,
    })
}

#[async_trait]
impl OptimizationCache for DieselOptimizationCache {
    async fn get(&self, route_id: &RouteId) -> Result<Option<CacheEntry>, OptimizationCacheError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let row: Option<OptimizationCacheRow> = route_optimization_cache::table
            .find(route_id.as_str())
            .select(OptimizationCacheRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_query_error)?;

        row.map(row_to_entry).transpose()
    }

    async fn put(
        &self,
        route_id: &RouteId,
        stops_fingerprint: &StopsFingerprint,
        result: &OptimizedResult,
    ) -> Result<(), OptimizationCacheError> {
        let total_distance_meters = i64::try_from(result.summary.total_distance_meters)
            .map_err(|_| OptimizationCacheError::serialization("route distance overflows BIGINT"))?;
        let row = NewOptimizationCacheRow {
            route_id: route_id.as_str(),
            stops_fingerprint: stops_fingerprint.as_str(),
            optimized_order: serde_json::to_value(&result.order).map_err(serialization_error)?,
            etas: serde_json::to_value(&result.etas).map_err(serialization_error)?,
            total_distance_meters,
            polyline: result.summary.polyline.as_deref(),
            used_live_traffic: result.summary.used_live_traffic,
            cached_at: self.clock.utc(),
        };
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        diesel::insert_into(route_optimization_cache::table)
            .values(&row)
            .on_conflict(route_optimization_cache::route_id)
            .do_update()
            .set((
                route_optimization_cache::stops_fingerprint
                    .eq(excluded(route_optimization_cache::stops_fingerprint)),
                route_optimization_cache::optimized_order
                    .eq(excluded(route_optimization_cache::optimized_order)),
                route_optimization_cache::etas.eq(excluded(route_optimization_cache::etas)),
                route_optimization_cache::total_distance_meters
                    .eq(excluded(route_optimization_cache::total_distance_meters)),
                route_optimization_cache::polyline
                    .eq(excluded(route_optimization_cache::polyline)),
                route_optimization_cache::used_live_traffic
                    .eq(excluded(route_optimization_cache::used_live_traffic)),
                route_optimization_cache::cached_at
                    .eq(excluded(route_optimization_cache::cached_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_query_error)
    }
}
