//! Driven port for the stored stop plan of a route.
//!
//! The stored plan is the source of stops when callers optimise a route by
//! id alone, and the target for the resulting visiting order and arrival
//! estimates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;
use crate::domain::{RouteId, Stop, StopId};

/// New position and arrival estimate for one stored stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledStop {
    /// Stop being rescheduled.
    pub stop_id: StopId,
    /// 1-based visiting position.
    pub sequence: u32,
    /// Wall-clock arrival estimate.
    pub estimated_arrival: DateTime<Utc>,
}

define_port_error! {
    /// Errors surfaced by route plan persistence.
    pub enum RoutePlanRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "route plan repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "route plan repository query failed: {message}",
    }
}

/// Port for reading and rescheduling the stops stored for a route.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoutePlanRepository: Send + Sync {
    /// Load stops for `route_id` ordered by their stored sequence.
    async fn load_stops(&self, route_id: &RouteId) -> Result<Vec<Stop>, RoutePlanRepositoryError>;

    /// Persist the new sequence and arrival estimate of each stop.
    async fn apply_schedule(
        &self,
        route_id: &RouteId,
        schedule: &[ScheduledStop],
    ) -> Result<(), RoutePlanRepositoryError>;
}

/// Fixture repository with no stored routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureRoutePlanRepository;

#[async_trait]
impl RoutePlanRepository for FixtureRoutePlanRepository {
    async fn load_stops(&self, _route_id: &RouteId) -> Result<Vec<Stop>, RoutePlanRepositoryError> {
        Ok(Vec::new())
    }

    async fn apply_schedule(
        &self,
        _route_id: &RouteId,
        _schedule: &[ScheduledStop],
    ) -> Result<(), RoutePlanRepositoryError> {
        Ok(())
    }
}
