//! Directions outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `RoutingProvider`
//! port against a Google Directions-compatible endpoint.

mod dto;
mod http_source;

pub use http_source::{DirectionsHttpConfig, DirectionsHttpSource, MAX_WAYPOINTS};
