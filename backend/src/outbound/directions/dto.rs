//! DTOs for decoding directions JSON responses.
//!
//! The adapter decodes into these transport DTOs first, then maps into a
//! domain [`RoutingPlan`] in one pass so upstream shape drift stops here.

use serde::Deserialize;

use crate::domain::ports::{RoutingPlan, RoutingProviderError};

const STATUS_OK: &str = "OK";

#[derive(Debug, Deserialize)]
pub(super) struct DirectionsResponseDto {
    pub(super) status: String,
    #[serde(default)]
    pub(super) error_message: Option<String>,
    #[serde(default)]
    pub(super) routes: Vec<DirectionsRouteDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectionsRouteDto {
    #[serde(default)]
    pub(super) waypoint_order: Option<Vec<usize>>,
    #[serde(default)]
    pub(super) legs: Vec<DirectionsLegDto>,
    #[serde(default)]
    pub(super) overview_polyline: Option<DirectionsPolylineDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectionsLegDto {
    #[serde(default)]
    pub(super) duration: Option<DirectionsValueDto>,
    #[serde(default)]
    pub(super) duration_in_traffic: Option<DirectionsValueDto>,
    #[serde(default)]
    pub(super) distance: Option<DirectionsValueDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectionsValueDto {
    pub(super) value: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectionsPolylineDto {
    pub(super) points: String,
}

impl DirectionsLegDto {
    /// Traffic-aware duration when present, otherwise the static one.
    fn seconds(&self, index: usize) -> Result<u64, RoutingProviderError> {
        self.duration_in_traffic
            .as_ref()
            .or(self.duration.as_ref())
            .map(|duration| duration.value)
            .ok_or_else(|| RoutingProviderError::decode(format!("leg {index} has no duration")))
    }
}

impl DirectionsResponseDto {
    /// Map the first route into a plan for `waypoint_count` waypoints.
    ///
    /// Every leg must carry a duration; distances default to zero.
    pub(super) fn into_plan(self, waypoint_count: usize) -> Result<RoutingPlan, RoutingProviderError> {
        if self.status != STATUS_OK {
            let message = self
                .error_message
                .unwrap_or_else(|| format!("directions request failed with {}", self.status));
            return Err(RoutingProviderError::status(self.status, message));
        }

        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoutingProviderError::decode("response contains no routes"))?;

        let expected_legs = waypoint_count + 1;
        if route.legs.len() != expected_legs {
            return Err(RoutingProviderError::decode(format!(
                "expected {expected_legs} legs, got {}",
                route.legs.len()
            )));
        }

        let leg_durations_seconds = route
            .legs
            .iter()
            .enumerate()
            .map(|(index, leg)| leg.seconds(index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RoutingPlan {
            waypoint_order: route
                .waypoint_order
                .unwrap_or_else(|| (0..waypoint_count).collect()),
            leg_durations_seconds,
            leg_distances_meters: route
                .legs
                .iter()
                .map(|leg| leg.distance.as_ref().map_or(0, |distance| distance.value))
                .collect(),
            polyline: route.overview_polyline.map(|polyline| polyline.points),
            used_live_traffic: route.legs.iter().any(|leg| leg.duration_in_traffic.is_some()),
        })
    }
}
