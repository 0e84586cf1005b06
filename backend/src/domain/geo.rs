//! Coordinate validation applied before stops reach routing logic.
//!
//! Every check is a pure predicate: invalid input yields `false` or is
//! dropped, never an error.

use std::ops::RangeInclusive;

const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;
const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

/// Anything positioned by a WGS84 latitude/longitude pair.
pub trait GeoPoint {
    /// Latitude in degrees.
    fn latitude(&self) -> f64;
    /// Longitude in degrees.
    fn longitude(&self) -> f64;
}

/// Bare latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl GeoPoint for Coordinate {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Return whether `value` is a finite latitude within `[-90, 90]`.
///
/// # Examples
/// ```
/// use route_optimizer::domain::geo::is_valid_latitude;
///
/// assert!(is_valid_latitude(-19.9167));
/// assert!(!is_valid_latitude(90.5));
/// assert!(!is_valid_latitude(f64::NAN));
/// ```
pub fn is_valid_latitude(value: f64) -> bool {
    value.is_finite() && LATITUDE_RANGE.contains(&value)
}

/// Return whether `value` is a finite longitude within `[-180, 180]`.
pub fn is_valid_longitude(value: f64) -> bool {
    value.is_finite() && LONGITUDE_RANGE.contains(&value)
}

/// Return whether both halves of a coordinate pair are valid.
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    is_valid_latitude(latitude) && is_valid_longitude(longitude)
}

/// Keep only points whose coordinates pass [`is_valid_coordinate`].
///
/// Relative order is preserved. Input made entirely of invalid points yields
/// an empty vector.
///
/// # Examples
/// ```
/// use route_optimizer::domain::geo::{filter_valid, Coordinate};
///
/// let points = vec![
///     Coordinate { latitude: -19.91, longitude: -43.93 },
///     Coordinate { latitude: f64::INFINITY, longitude: 0.0 },
/// ];
/// assert_eq!(filter_valid(points).len(), 1);
/// ```
pub fn filter_valid<P, I>(points: I) -> Vec<P>
where
    P: GeoPoint,
    I: IntoIterator<Item = P>,
{
    points
        .into_iter()
        .filter(|point| is_valid_coordinate(point.latitude(), point.longitude()))
        .collect()
}
