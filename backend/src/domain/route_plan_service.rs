//! Optimisation of routes whose stops are already stored.
//!
//! Stops are loaded from the route plan, invalid coordinates are dropped, and
//! the optimiser decides the order. Freshly computed orders are written back
//! to the plan together with wall-clock arrival estimates.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::{info, warn};

use super::geo::filter_valid;
use super::optimization::{OptimizationRequest, OptimizedResult, RouteOptimizationError};
use super::ports::{
    RouteOptimizationCommand, RoutePlanRepository, RoutePlanRepositoryError, ScheduledStop,
    StoredRouteOptimizationCommand,
};
use super::RouteId;

/// Service implementing [`StoredRouteOptimizationCommand`].
#[derive(Clone)]
pub struct RoutePlanOptimizationService {
    plans: Arc<dyn RoutePlanRepository>,
    optimizer: Arc<dyn RouteOptimizationCommand>,
    clock: Arc<dyn Clock>,
}

impl RoutePlanOptimizationService {
    /// Create the service from a plan repository and an optimiser.
    pub fn new(
        plans: Arc<dyn RoutePlanRepository>,
        optimizer: Arc<dyn RouteOptimizationCommand>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            plans,
            optimizer,
            clock,
        }
    }
}

/// Turn cumulative ETAs into arrival times relative to `planned_at`.
///
/// Stops whose arrival would overflow the calendar are left out.
pub fn schedule_from(result: &OptimizedResult, planned_at: DateTime<Utc>) -> Vec<ScheduledStop> {
    result
        .order
        .iter()
        .filter_map(|stop| {
            let eta = result.etas.get(&stop.id).copied()?;
            let offset = i64::try_from(eta).ok().and_then(TimeDelta::try_seconds)?;
            Some(ScheduledStop {
                stop_id: stop.id.clone(),
                sequence: stop.sequence,
                estimated_arrival: planned_at.checked_add_signed(offset)?,
            })
        })
        .collect()
}

fn map_plan_error(error: RoutePlanRepositoryError) -> RouteOptimizationError {
    RouteOptimizationError::RoutePlanUnavailable {
        message: error.to_string(),
    }
}

#[async_trait]
impl StoredRouteOptimizationCommand for RoutePlanOptimizationService {
    async fn optimize_stored_route(
        &self,
        route_id: &RouteId,
    ) -> Result<OptimizedResult, RouteOptimizationError> {
        let stored = self.plans.load_stops(route_id).await.map_err(map_plan_error)?;
        let stored_count = stored.len();
        let stops = filter_valid(stored);
        if stops.len() < stored_count {
            warn!(
                route_id = %route_id,
                dropped = stored_count - stops.len(),
                "skipping stored stops with invalid coordinates"
            );
        }
        if stops.len() < 2 {
            return Err(RouteOptimizationError::invalid_request(
                "route needs at least two stops with valid coordinates",
            ));
        }

        let result = self
            .optimizer
            .optimize(OptimizationRequest::new(route_id.clone(), stops))
            .await?;
        if result.is_cached() {
            return Ok(result);
        }

        let schedule = schedule_from(&result, self.clock.utc());
        match self.plans.apply_schedule(route_id, &schedule).await {
            Ok(()) => info!(route_id = %route_id, stops = schedule.len(), "route plan rescheduled"),
            Err(error) => warn!(route_id = %route_id, %error, "failed to write back route plan"),
        }
        Ok(result)
    }
}
