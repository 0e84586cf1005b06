//! Driven port for the external directions service that orders waypoints.
//!
//! The domain owns the request and response contract so the optimiser never
//! sees the provider's JSON shape. Adapters translate their wire format into
//! [`RoutingPlan`] at the boundary.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::Stop;

/// Upstream status reported when too many waypoints are supplied.
pub const MAX_WAYPOINTS_EXCEEDED: &str = "MAX_WAYPOINTS_EXCEEDED";

/// Visiting order and leg timings returned by a routing provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RoutingPlan {
    /// Permutation of indices into the waypoint slice passed to the provider.
    pub waypoint_order: Vec<usize>,
    /// Travel time for each leg in seconds, origin first.
    ///
    /// Traffic-aware when the provider had live traffic for the leg.
    pub leg_durations_seconds: Vec<u64>,
    /// Distance of each leg in metres; may be empty when not reported.
    pub leg_distances_meters: Vec<u64>,
    /// Encoded overview polyline of the whole route.
    pub polyline: Option<String>,
    /// Whether any leg duration came from live traffic data.
    pub used_live_traffic: bool,
}

define_port_error! {
    /// Errors surfaced while calling the routing provider.
    pub enum RoutingProviderError {
        /// Provider credentials or endpoint are missing.
        NotConfigured { message: String } =>
            "routing provider is not configured: {message}",
        /// Provider answered with a non-`OK` status field.
        Status { status: String, message: String } =>
            "routing provider returned {status}: {message}",
        /// Provider answered with a non-success HTTP status.
        UpstreamStatus { status: u16, message: String } =>
            "routing provider HTTP status {status}: {message}",
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "routing provider transport failed: {message}",
        /// Provider call exceeded the configured timeout.
        Timeout { message: String } =>
            "routing provider timed out: {message}",
        /// Provider response could not be decoded into a plan.
        Decode { message: String } =>
            "routing provider response decode failed: {message}",
    }
}

impl RoutingProviderError {
    /// Upstream status string, when the provider reported one.
    pub fn provider_status(&self) -> Option<&str> {
        match self {
            Self::Status { status, .. } => Some(status.as_str()),
            _ => None,
        }
    }

    /// Message suitable for end users, chosen by upstream status.
    ///
    /// # Examples
    /// ```
    /// use route_optimizer::domain::ports::RoutingProviderError;
    ///
    /// let err = RoutingProviderError::status("ZERO_RESULTS", "no route");
    /// assert_eq!(
    ///     err.user_message(),
    ///     "No route could be found between the supplied stops"
    /// );
    /// ```
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotConfigured { .. } => "Routing provider credentials are not configured",
            Self::Status { status, .. } => status_message(status),
            Self::Timeout { .. } => "The routing provider did not answer in time",
            Self::Transport { .. } | Self::UpstreamStatus { .. } => {
                "Could not reach the routing provider"
            }
            Self::Decode { .. } => "The routing provider returned an unreadable response",
        }
    }
}

fn status_message(status: &str) -> &'static str {
    match status {
        "NOT_FOUND" => "One or more stops could not be geocoded",
        "ZERO_RESULTS" => "No route could be found between the supplied stops",
        MAX_WAYPOINTS_EXCEEDED => "Too many intermediate stops (maximum of 25 waypoints)",
        "INVALID_REQUEST" => "Invalid routing request; check the stop coordinates",
        "OVER_QUERY_LIMIT" => "Routing provider quota exceeded; try again later",
        "REQUEST_DENIED" => "Routing provider denied the request; check the API key",
        _ => "Unknown routing provider error",
    }
}

/// Port computing a visiting order for the intermediate stops of a route.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Order `waypoints` between the fixed `origin` and `destination`.
    ///
    /// The returned `waypoint_order` indexes into `waypoints`, and
    /// `leg_durations_seconds` holds one entry per leg of the reordered route.
    /// Implementations perform no retries.
    async fn compute_order(
        &self,
        origin: &Stop,
        destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RoutingPlan, RoutingProviderError>;
}

/// Provider used when no credentials are configured; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredRoutingProvider;

#[async_trait]
impl RoutingProvider for UnconfiguredRoutingProvider {
    async fn compute_order(
        &self,
        _origin: &Stop,
        _destination: &Stop,
        _waypoints: &[Stop],
    ) -> Result<RoutingPlan, RoutingProviderError> {
        Err(RoutingProviderError::not_configured(
            "no directions API key is set",
        ))
    }
}

/// Fixture provider keeping the input order with a fixed duration per leg.
#[derive(Debug, Clone, Copy)]
pub struct FixtureRoutingProvider {
    /// Seconds reported for every leg.
    pub leg_seconds: u64,
}

impl Default for FixtureRoutingProvider {
    fn default() -> Self {
        Self { leg_seconds: 60 }
    }
}

#[async_trait]
impl RoutingProvider for FixtureRoutingProvider {
    async fn compute_order(
        &self,
        _origin: &Stop,
        _destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RoutingPlan, RoutingProviderError> {
        Ok(RoutingPlan {
            waypoint_order: (0..waypoints.len()).collect(),
            leg_durations_seconds: vec![self.leg_seconds; waypoints.len() + 1],
            ..RoutingPlan::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopId;
    use rstest::rstest;

    fn stop(id: &str) -> Stop {
        Stop::new(StopId::new(id).expect("id"), 0.0, 0.0)
    }

    #[rstest]
    #[case("NOT_FOUND", "One or more stops could not be geocoded")]
    #[case("OVER_QUERY_LIMIT", "Routing provider quota exceeded; try again later")]
    #[case("SOMETHING_NEW", "Unknown routing provider error")]
    fn status_errors_map_to_user_messages(#[case] status: &str, #[case] expected: &str) {
        let err = RoutingProviderError::status(status, "upstream detail");
        assert_eq!(err.user_message(), expected);
        assert_eq!(err.provider_status(), Some(status));
    }

    #[rstest]
    fn transport_errors_have_no_provider_status() {
        assert!(RoutingProviderError::transport("reset").provider_status().is_none());
    }

    #[tokio::test]
    async fn unconfigured_provider_always_fails() {
        let result = UnconfiguredRoutingProvider
            .compute_order(&stop("a"), &stop("b"), &[])
            .await;
        assert!(matches!(result, Err(RoutingProviderError::NotConfigured { .. })));
    }

    #[tokio::test]
    async fn fixture_provider_keeps_input_order() {
        let plan = FixtureRoutingProvider { leg_seconds: 30 }
            .compute_order(&stop("a"), &stop("d"), &[stop("b"), stop("c")])
            .await
            .expect("fixture succeeds");
        assert_eq!(plan.waypoint_order, vec![0, 1]);
        assert_eq!(plan.leg_durations_seconds, vec![30, 30, 30]);
    }
}
