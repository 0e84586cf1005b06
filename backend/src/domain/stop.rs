//! Stops: the immutable inputs of an optimisation request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geo::GeoPoint;

/// Opaque stop identifier, unique within one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StopId(String);

/// Validation errors raised by [`StopId::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StopIdValidationError {
    /// Identifier was blank.
    #[error("stop id must not be empty")]
    Empty,
}

impl StopId {
    /// Validate and wrap a stop identifier.
    pub fn new(value: impl Into<String>) -> Result<Self, StopIdValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(StopIdValidationError::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the identifier.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for StopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for StopId {
    type Error = StopIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StopId> for String {
    fn from(value: StopId) -> Self {
        value.0
    }
}

/// A point to visit on a route.
///
/// `sequence` is a caller-supplied ordering hint and is never authoritative;
/// the optimiser assigns the visiting order.
///
/// # Examples
/// ```
/// use route_optimizer::domain::{Stop, StopId};
///
/// let stop = Stop::new(StopId::new("a").expect("id"), -19.9167, -43.9345);
/// assert_eq!(stop.sequence, None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    /// Stop identifier.
    pub id: StopId,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Optional ordering hint.
    pub sequence: Option<u32>,
}

impl Stop {
    /// Build a stop without an ordering hint.
    pub fn new(id: StopId, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            latitude,
            longitude,
            sequence: None,
        }
    }

    /// Attach the caller's ordering hint.
    #[must_use]
    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

impl GeoPoint for Stop {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}
