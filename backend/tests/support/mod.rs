//! Shared doubles for route optimisation integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so the
//! scripted provider and controllable clock live here rather than being copied
//! into each suite.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use route_optimizer::domain::ports::{RoutingPlan, RoutingProvider, RoutingProviderError};
use route_optimizer::domain::{Stop, StopId};

/// Wall-clock instant every suite starts from.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 2, 9, 30, 0)
        .single()
        .expect("valid fixed time")
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        let mut guard = self.0.lock().expect("clock mutex");
        *guard += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}

/// Routing provider replaying queued answers in order.
///
/// Once the script is exhausted every call fails with a transport error.
#[derive(Default)]
pub struct ScriptedRoutingProvider {
    scripted: Mutex<VecDeque<Result<RoutingPlan, RoutingProviderError>>>,
    calls: AtomicUsize,
    waypoint_counts: Mutex<Vec<usize>>,
}

impl ScriptedRoutingProvider {
    pub fn new(scripted: Vec<Result<RoutingPlan, RoutingProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            scripted: Mutex::new(scripted.into()),
            ..Self::default()
        })
    }

    pub fn push(&self, answer: Result<RoutingPlan, RoutingProviderError>) {
        self.scripted
            .lock()
            .expect("provider script mutex")
            .push_back(answer);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of waypoints seen by each call, oldest first.
    pub fn waypoint_counts(&self) -> Vec<usize> {
        self.waypoint_counts
            .lock()
            .expect("waypoint mutex")
            .clone()
    }
}

#[async_trait]
impl RoutingProvider for ScriptedRoutingProvider {
    async fn compute_order(
        &self,
        _origin: &Stop,
        _destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RoutingPlan, RoutingProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.waypoint_counts
            .lock()
            .expect("waypoint mutex")
            .push(waypoints.len());
        self.scripted
            .lock()
            .expect("provider script mutex")
            .pop_front()
            .unwrap_or_else(|| Err(RoutingProviderError::transport("provider script exhausted")))
    }
}

/// Plan listing `waypoint_order` and one duration per leg.
pub fn plan(waypoint_order: &[usize], leg_durations_seconds: &[u64]) -> RoutingPlan {
    RoutingPlan {
        waypoint_order: waypoint_order.to_vec(),
        leg_durations_seconds: leg_durations_seconds.to_vec(),
        ..RoutingPlan::default()
    }
}

/// Stops with the given ids placed a little apart around Belo Horizonte.
pub fn stops(ids: &[&str]) -> Vec<Stop> {
    ids.iter()
        .zip(0_u32..)
        .map(|(id, index)| {
            let offset = f64::from(index) * 0.01;
            Stop::new(
                StopId::new(*id).expect("stop id"),
                -19.9167 - offset,
                -43.9345 + offset,
            )
        })
        .collect()
}
