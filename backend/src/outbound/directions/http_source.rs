//! Reqwest-backed directions adapter.
//!
//! This adapter owns transport details only: query construction, timeout and
//! HTTP error mapping, and JSON decoding into a domain routing plan.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::DirectionsResponseDto;
use crate::domain::ports::{
    MAX_WAYPOINTS_EXCEEDED, RoutingPlan, RoutingProvider, RoutingProviderError,
};
use crate::domain::Stop;

/// Largest number of intermediate stops the provider accepts.
pub const MAX_WAYPOINTS: usize = 25;

/// Departure sent with every request so the provider reports live traffic.
const DEPARTURE_TIME: &str = "now";
const TRAFFIC_MODEL: &str = "best_guess";

/// Connection settings for a directions endpoint.
#[derive(Debug, Clone)]
pub struct DirectionsHttpConfig {
    /// Directions JSON endpoint.
    pub endpoint: Url,
    /// API key sent as the `key` query parameter.
    pub api_key: String,
    /// Language for provider messages.
    pub language: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

/// Directions adapter that performs HTTP GET requests against one endpoint.
pub struct DirectionsHttpSource {
    client: Client,
    endpoint: Url,
    api_key: String,
    language: String,
}

impl DirectionsHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,no_run
    /// # use std::time::Duration;
    /// # use route_optimizer::outbound::directions::{DirectionsHttpConfig, DirectionsHttpSource};
    /// let source = DirectionsHttpSource::new(DirectionsHttpConfig {
    ///     endpoint: "https://maps.googleapis.com/maps/api/directions/json"
    ///         .parse()
    ///         .expect("valid url"),
    ///     api_key: "secret".into(),
    ///     language: "pt-BR".into(),
    ///     timeout: Duration::from_secs(10),
    /// });
    /// assert!(source.is_ok());
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: DirectionsHttpConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint,
            api_key: config.api_key,
            language: config.language,
        })
    }
}

#[async_trait]
impl RoutingProvider for DirectionsHttpSource {
    async fn compute_order(
        &self,
        origin: &Stop,
        destination: &Stop,
        waypoints: &[Stop],
    ) -> Result<RoutingPlan, RoutingProviderError> {
        if waypoints.len() > MAX_WAYPOINTS {
            return Err(RoutingProviderError::status(
                MAX_WAYPOINTS_EXCEEDED,
                format!(
                    "{} waypoints supplied, at most {MAX_WAYPOINTS} are supported",
                    waypoints.len()
                ),
            ));
        }

        let query = build_query(origin, destination, waypoints, &self.api_key, &self.language);
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&query)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_plan(body.as_ref(), waypoints.len())
    }
}

fn parse_plan(body: &[u8], waypoint_count: usize) -> Result<RoutingPlan, RoutingProviderError> {
    let decoded: DirectionsResponseDto = serde_json::from_slice(body).map_err(|error| {
        RoutingProviderError::decode(format!("invalid directions JSON payload: {error}"))
    })?;
    decoded.into_plan(waypoint_count)
}

fn lat_lng(stop: &Stop) -> String {
    format!("{},{}", stop.latitude, stop.longitude)
}

fn build_query(
    origin: &Stop,
    destination: &Stop,
    waypoints: &[Stop],
    api_key: &str,
    language: &str,
) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("origin", lat_lng(origin)),
        ("destination", lat_lng(destination)),
    ];
    if !waypoints.is_empty() {
        let flagged = std::iter::once("optimize:true".to_owned())
            .chain(waypoints.iter().map(lat_lng))
            .collect::<Vec<_>>()
            .join("|");
        query.push(("waypoints", flagged));
    }
    query.push(("departure_time", DEPARTURE_TIME.to_owned()));
    query.push(("traffic_model", TRAFFIC_MODEL.to_owned()));
    query.push(("key", api_key.to_owned()));
    query.push(("language", language.to_owned()));
    query
}

fn map_transport_error(error: reqwest::Error) -> RoutingProviderError {
    if error.is_timeout() {
        RoutingProviderError::timeout(error.to_string())
    } else {
        RoutingProviderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> RoutingProviderError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            RoutingProviderError::timeout(message)
        }
        _ => RoutingProviderError::upstream_status(status.as_u16(), message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
