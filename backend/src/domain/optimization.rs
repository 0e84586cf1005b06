//! Optimisation requests, results, and the order reconstruction algorithm.
//!
//! A request pins its first and last stops as origin and destination; the
//! stops in between are handed to the routing provider as waypoints. The
//! provider answers with a permutation of waypoint indices plus one travel
//! time per leg, which is turned into a 1-based visiting order and cumulative
//! ETAs here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::ports::{RoutingPlan, RoutingProviderError};
use super::{Error, RouteId, Stop, StopId};

/// Cumulative seconds from the origin, keyed by stop id.
pub type StopEtas = BTreeMap<StopId, u64>;

/// Digest of a stop list: ids and coordinates, in caller order.
///
/// Cache entries carry the fingerprint of the stops they were computed for,
/// so a route whose stops change is never answered with an old order.
///
/// # Examples
/// ```
/// use route_optimizer::domain::{Stop, StopId, StopsFingerprint};
///
/// let stop = |id: &str| Stop::new(StopId::new(id).expect("id"), -19.9, -43.9);
/// let forward = StopsFingerprint::of(&[stop("a"), stop("b")]);
/// let reversed = StopsFingerprint::of(&[stop("b"), stop("a")]);
/// assert_eq!(forward, StopsFingerprint::of(&[stop("a"), stop("b")]));
/// assert_ne!(forward, reversed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopsFingerprint(String);

impl StopsFingerprint {
    /// Fingerprint `stops`.
    pub fn of(stops: &[Stop]) -> Self {
        let mut hasher = Sha256::new();
        for stop in stops {
            hasher.update(stop.id.as_str().as_bytes());
            hasher.update([0]);
            hasher.update(stop.latitude.to_bits().to_be_bytes());
            hasher.update(stop.longitude.to_bits().to_be_bytes());
        }
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap a fingerprint read back from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A route and the stops to visit, origin first and destination last.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationRequest {
    /// Identity under which results are cached.
    pub route_id: RouteId,
    /// Stops in caller order.
    pub stops: Vec<Stop>,
}

impl OptimizationRequest {
    /// Bundle a route id with its stops.
    pub fn new(route_id: RouteId, stops: Vec<Stop>) -> Self {
        Self { route_id, stops }
    }
}

/// Fixed endpoints and reorderable waypoints of a request.
#[derive(Debug, Clone, Copy)]
pub struct RouteEndpoints<'a> {
    /// First stop; always visited first.
    pub origin: &'a Stop,
    /// Last stop; always visited last.
    pub destination: &'a Stop,
    /// Intermediate stops, possibly empty.
    pub waypoints: &'a [Stop],
}

impl<'a> RouteEndpoints<'a> {
    /// Split `stops` into endpoints and waypoints.
    ///
    /// Returns `None` when fewer than two stops are supplied.
    ///
    /// # Examples
    /// ```
    /// use route_optimizer::domain::{RouteEndpoints, Stop, StopId};
    ///
    /// let stops: Vec<Stop> = ["a", "b", "c"]
    ///     .into_iter()
    ///     .map(|id| Stop::new(StopId::new(id).expect("id"), 0.0, 0.0))
    ///     .collect();
    /// let endpoints = RouteEndpoints::split(&stops).expect("three stops");
    /// assert_eq!(endpoints.origin.id.as_str(), "a");
    /// assert_eq!(endpoints.waypoints.len(), 1);
    /// ```
    pub fn split(stops: &'a [Stop]) -> Option<Self> {
        match stops {
            [origin, waypoints @ .., destination] => Some(Self {
                origin,
                destination,
                waypoints,
            }),
            _ => None,
        }
    }

    /// Number of stops including both endpoints.
    pub fn stop_count(&self) -> usize {
        self.waypoints.len() + 2
    }
}

/// A stop annotated with its 1-based visiting position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequencedStop {
    /// Stop identifier.
    pub id: StopId,
    /// Visiting position; the origin is 1.
    pub sequence: u32,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl SequencedStop {
    fn from_stop(stop: &Stop, sequence: u32) -> Self {
        Self {
            id: stop.id.clone(),
            sequence,
            latitude: stop.latitude,
            longitude: stop.longitude,
        }
    }
}

/// Where an [`OptimizedResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// Served from a fresh cache entry.
    Cache,
    /// Freshly computed by the routing provider.
    Provider,
}

/// Route-wide figures reported by the provider next to the order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    /// Sum of leg distances.
    pub total_distance_meters: u64,
    /// Encoded overview polyline, when the provider sent one.
    pub polyline: Option<String>,
    /// Whether leg durations account for live traffic.
    pub used_live_traffic: bool,
}

impl RouteSummary {
    /// Summarise the route-wide parts of `plan`.
    pub fn from_plan(plan: &RoutingPlan) -> Self {
        Self {
            total_distance_meters: plan
                .leg_distances_meters
                .iter()
                .fold(0_u64, |total, leg| total.saturating_add(*leg)),
            polyline: plan.polyline.clone(),
            used_live_traffic: plan.used_live_traffic,
        }
    }
}

/// Visiting order and ETAs for one route.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedResult {
    /// Stops in visiting order.
    pub order: Vec<SequencedStop>,
    /// Cumulative ETA per stop.
    pub etas: StopEtas,
    /// ETA of the last stop in `order`.
    pub total_duration_seconds: u64,
    /// Distance, polyline and traffic flag of the route.
    pub summary: RouteSummary,
    /// Whether the result came from cache or the provider.
    pub source: ResultSource,
}

impl OptimizedResult {
    /// Build a result, deriving the total from the last stop's ETA.
    pub fn new(order: Vec<SequencedStop>, etas: StopEtas, source: ResultSource) -> Self {
        let total_duration_seconds = order
            .last()
            .and_then(|stop| etas.get(&stop.id))
            .copied()
            .unwrap_or_default();
        Self {
            order,
            etas,
            total_duration_seconds,
            summary: RouteSummary::default(),
            source,
        }
    }

    /// Attach route-wide figures.
    #[must_use]
    pub fn with_summary(mut self, summary: RouteSummary) -> Self {
        self.summary = summary;
        self
    }

    /// True when served from cache.
    pub fn is_cached(&self) -> bool {
        self.source == ResultSource::Cache
    }
}

/// Reasons a provider plan cannot be applied to a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructionError {
    /// `waypoint_order` is not a permutation of the waypoint indices.
    #[error("waypoint order {order:?} is not a permutation of 0..{waypoints}")]
    NotAPermutation { order: Vec<usize>, waypoints: usize },
    /// Leg count does not match the number of consecutive stop pairs.
    #[error("expected {expected} leg durations, got {actual}")]
    LegCountMismatch { expected: usize, actual: usize },
}

impl From<ReconstructionError> for RoutingProviderError {
    fn from(value: ReconstructionError) -> Self {
        RoutingProviderError::decode(value.to_string())
    }
}

/// Rebuild the full visiting order from a provider permutation.
///
/// The origin takes sequence 1, waypoints follow in `plan.waypoint_order`,
/// and the destination comes last.
pub fn reconstruct_visit_order(
    endpoints: &RouteEndpoints<'_>,
    plan: &RoutingPlan,
) -> Result<Vec<SequencedStop>, ReconstructionError> {
    let not_a_permutation = || ReconstructionError::NotAPermutation {
        order: plan.waypoint_order.clone(),
        waypoints: endpoints.waypoints.len(),
    };
    if plan.waypoint_order.len() != endpoints.waypoints.len() {
        return Err(not_a_permutation());
    }

    let mut seen = vec![false; endpoints.waypoints.len()];
    let mut visits = Vec::with_capacity(endpoints.stop_count());
    visits.push(endpoints.origin);
    for &index in &plan.waypoint_order {
        let (Some(stop), Some(slot)) = (endpoints.waypoints.get(index), seen.get_mut(index))
        else {
            return Err(not_a_permutation());
        };
        if std::mem::replace(slot, true) {
            return Err(not_a_permutation());
        }
        visits.push(stop);
    }
    visits.push(endpoints.destination);

    Ok((1_u32..)
        .zip(visits)
        .map(|(sequence, stop)| SequencedStop::from_stop(stop, sequence))
        .collect())
}

/// Running sum of leg durations, one ETA per stop in `order`.
///
/// The origin's ETA is zero and leg `k` leads from stop `k` to stop `k + 1`.
///
/// # Examples
/// ```
/// use route_optimizer::domain::{cumulative_etas, SequencedStop, StopId};
///
/// let order: Vec<SequencedStop> = [("a", 1), ("b", 2), ("c", 3)]
///     .into_iter()
///     .map(|(id, sequence)| SequencedStop {
///         id: StopId::new(id).expect("id"),
///         sequence,
///         latitude: 0.0,
///         longitude: 0.0,
///     })
///     .collect();
/// let etas = cumulative_etas(&order, &[120, 30]).expect("matching legs");
/// assert_eq!(etas[&StopId::new("c").expect("id")], 150);
/// ```
pub fn cumulative_etas(
    order: &[SequencedStop],
    leg_durations_seconds: &[u64],
) -> Result<StopEtas, ReconstructionError> {
    let expected = order.len().saturating_sub(1);
    if leg_durations_seconds.len() != expected {
        return Err(ReconstructionError::LegCountMismatch {
            expected,
            actual: leg_durations_seconds.len(),
        });
    }

    let mut elapsed = 0_u64;
    let mut etas = StopEtas::new();
    let legs = std::iter::once(0).chain(leg_durations_seconds.iter().copied());
    for (stop, leg) in order.iter().zip(legs) {
        elapsed = elapsed.saturating_add(leg);
        etas.insert(stop.id.clone(), elapsed);
    }
    Ok(etas)
}

/// Explicit outcome of a failed optimisation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteOptimizationError {
    /// Request shape is unusable; never retried.
    #[error("invalid optimisation request: {message}")]
    InvalidRequest { message: String },
    /// No routing provider credentials are available.
    #[error("routing provider is not configured: {message}")]
    ProviderNotConfigured { message: String },
    /// The routing provider failed; nothing was cached.
    #[error(transparent)]
    Provider(RoutingProviderError),
    /// Stored route plan could not be read.
    #[error("route plan unavailable: {message}")]
    RoutePlanUnavailable { message: String },
}

impl RouteOptimizationError {
    /// Helper for [`RouteOptimizationError::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}

impl From<RoutingProviderError> for RouteOptimizationError {
    fn from(value: RoutingProviderError) -> Self {
        match value {
            RoutingProviderError::NotConfigured { message } => {
                Self::ProviderNotConfigured { message }
            }
            other => Self::Provider(other),
        }
    }
}

impl From<RouteOptimizationError> for Error {
    fn from(value: RouteOptimizationError) -> Self {
        match value {
            RouteOptimizationError::InvalidRequest { message } => Error::invalid_request(message),
            RouteOptimizationError::ProviderNotConfigured { .. } => {
                Error::provider_not_configured("Routing provider credentials are not configured")
            }
            RouteOptimizationError::Provider(err) => {
                let error = Error::provider_error(err.user_message());
                match err.provider_status() {
                    Some(status) => error.with_details(json!({ "providerStatus": status })),
                    None => error,
                }
            }
            RouteOptimizationError::RoutePlanUnavailable { .. } => {
                Error::service_unavailable("Route plan storage is unavailable")
            }
        }
    }
}
