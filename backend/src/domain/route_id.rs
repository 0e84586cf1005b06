//! Route identity shared by the optimiser and its cache adapters.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier grouping the stops of one reusable route.
///
/// Every optimisation cache entry is keyed by this value, so it must be
/// stable: blank or whitespace-padded values are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RouteId(String);

impl RouteId {
    /// Construct a route identifier after validating that it is non-empty and trimmed.
    ///
    /// # Examples
    /// ```
    /// use route_optimizer::domain::RouteId;
    ///
    /// let id = RouteId::new("route-42").expect("valid route id");
    /// assert_eq!(id.as_str(), "route-42");
    /// assert!(RouteId::new("  ").is_err());
    /// ```
    pub fn new(value: impl Into<String>) -> Result<Self, RouteIdValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(RouteIdValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(RouteIdValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for RouteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for RouteId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<String> for RouteId {
    type Error = RouteIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RouteId> for String {
    fn from(value: RouteId) -> Self {
        value.0
    }
}

/// Validation errors returned when constructing [`RouteId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteIdValidationError {
    /// Identifier is empty after trimming whitespace.
    #[error("route id must not be empty")]
    Empty,
    /// Identifier contains leading or trailing whitespace.
    #[error("route id must not contain surrounding whitespace")]
    ContainsWhitespace,
}
