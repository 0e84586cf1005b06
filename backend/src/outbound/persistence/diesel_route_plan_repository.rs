//! PostgreSQL-backed `RoutePlanRepository` implementation using Diesel ORM.
//!
//! Stops live in `route_plan_stops`, one row per `(route_id, stop_id)`.
//! Rescheduling updates `stop_order` and `estimated_arrival_time` for every
//! stop in one transaction so readers never see a half-applied order.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{RoutePlanRepository, RoutePlanRepositoryError, ScheduledStop};
use crate::domain::{RouteId, Stop, StopId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::RoutePlanStopRow;
use super::pool::{DbPool, PoolError};
use super::schema::route_plan_stops;

/// Diesel-backed route plan repository.
#[derive(Clone)]
pub struct DieselRoutePlanRepository {
    pool: DbPool,
}

impl DieselRoutePlanRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_checkout_error(error: PoolError) -> RoutePlanRepositoryError {
    map_pool_error(error, |message| RoutePlanRepositoryError::connection(message))
}

fn map_query_error(error: diesel::result::Error) -> RoutePlanRepositoryError {
    map_diesel_error(
        error,
        |message| RoutePlanRepositoryError::query(message),
        |message| RoutePlanRepositoryError::connection(message),
    )
}

fn row_to_stop(row: RoutePlanStopRow) -> Result<Stop, RoutePlanRepositoryError> {
    let id = StopId::new(row.stop_id).map_err(|error| {
        RoutePlanRepositoryError::query(format!("invalid stop id in database: {error}"))
    })?;
    let stop = Stop::new(id, row.latitude, row.longitude);
    Ok(match u32::try_from(row.stop_order) {
        Ok(sequence) => stop.with_sequence(sequence),
        Err(_) => stop,
    })
}

#[async_trait]
impl RoutePlanRepository for DieselRoutePlanRepository {
    async fn load_stops(&self, route_id: &RouteId) -> Result<Vec<Stop>, RoutePlanRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let rows: Vec<RoutePlanStopRow> = route_plan_stops::table
            .filter(route_plan_stops::route_id.eq(route_id.as_str()))
            .order((route_plan_stops::stop_order.asc(), route_plan_stops::stop_id.asc()))
            .select(RoutePlanStopRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_query_error)?;

        rows.into_iter().map(row_to_stop).collect()
    }

    async fn apply_schedule(
        &self,
        route_id: &RouteId,
        schedule: &[ScheduledStop],
    ) -> Result<(), RoutePlanRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        if schedule.is_empty() {
            return Ok(());
        }
        let rows = schedule
            .iter()
            .map(|stop| {
                i32::try_from(stop.sequence)
                    .map(|sequence| (stop.stop_id.as_str(), sequence, stop.estimated_arrival))
                    .map_err(|_| {
                        RoutePlanRepositoryError::query(format!(
                            "sequence {} does not fit the stop_order column",
                            stop.sequence
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let route = route_id.as_str();
        let mut conn = self.pool.get().await.map_err(map_checkout_error)?;

        let updated = conn
            .transaction(|conn| {
                async move {
                    let mut updated = 0_usize;
                    for (stop_id, sequence, arrival) in rows {
                        updated += diesel::update(
                            route_plan_stops::table
                                .filter(route_plan_stops::route_id.eq(route))
                                .filter(route_plan_stops::stop_id.eq(stop_id)),
                        )
                        .set((
                            route_plan_stops::stop_order.eq(sequence),
                            route_plan_stops::estimated_arrival_time.eq(Some(arrival)),
                        ))
                        .execute(conn)
                        .await?;
                    }
                    Ok::<_, diesel::result::Error>(updated)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_query_error)?;

        if updated != schedule.len() {
            warn!(
                route_id = %route_id,
                expected = schedule.len(),
                updated,
                "some scheduled stops were not found in the route plan"
            );
        }
        Ok(())
    }
}
