//! Redis-backed optimisation cache.
//!
//! Entries are stored as JSON under `<prefix>:<sha256(route_id)>` with a plain
//! `SET` and no TTL. The JSON carries the stop fingerprint the entry was
//! computed for. Hashing keeps caller-supplied route ids out of the
//! keyspace and bounds key length.

use std::sync::Arc;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, RunError};
use bb8_redis::redis::{self, RedisError};
use mockable::Clock;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::domain::ports::{CacheEntry, OptimizationCache, OptimizationCacheError};
use crate::domain::{OptimizedResult, RouteId, StopsFingerprint};

/// Errors raised while building the Redis pool.
#[derive(Debug, thiserror::Error)]
pub enum RedisCacheError {
    /// Connection URL was rejected.
    #[error("invalid redis url: {0}")]
    InvalidUrl(#[source] RedisError),
    /// Pool could not be built.
    #[error("failed to build redis pool: {0}")]
    Build(#[source] RedisError),
}

/// Derive the Redis key for `route_id` under `prefix`.
///
/// # Examples
/// ```
/// use route_optimizer::domain::RouteId;
/// use route_optimizer::outbound::cache::redis_cache_key;
///
/// let key = redis_cache_key("route-optimization:v1", &RouteId::new("r-1").expect("id"));
/// assert!(key.starts_with("route-optimization:v1:"));
/// assert_eq!(key.len(), "route-optimization:v1:".len() + 64);
/// ```
pub fn redis_cache_key(prefix: &str, route_id: &RouteId) -> String {
    let digest = Sha256::digest(route_id.as_str().as_bytes());
    format!("{prefix}:{}", hex::encode(digest))
}

/// Optimisation cache shared through Redis.
#[derive(Clone)]
pub struct RedisOptimizationCache {
    pool: Pool<RedisConnectionManager>,
    key_prefix: String,
    clock: Arc<dyn Clock>,
}

impl RedisOptimizationCache {
    /// Connect a pool to `url`.
    ///
    /// Connections are established lazily, so an unreachable server surfaces
    /// as `Backend` errors on first use rather than here.
    pub async fn connect(
        url: &str,
        key_prefix: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, RedisCacheError> {
        let manager = RedisConnectionManager::new(url).map_err(RedisCacheError::InvalidUrl)?;
        let pool = Pool::builder()
            .build(manager)
            .await
            .map_err(RedisCacheError::Build)?;
        Ok(Self::from_pool(pool, key_prefix, clock))
    }

    /// Wrap an existing pool.
    pub fn from_pool(
        pool: Pool<RedisConnectionManager>,
        key_prefix: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pool,
            key_prefix: key_prefix.into(),
            clock,
        }
    }

    fn key(&self, route_id: &RouteId) -> String {
        redis_cache_key(&self.key_prefix, route_id)
    }
}

fn map_pool_error(error: RunError<RedisError>) -> OptimizationCacheError {
    OptimizationCacheError::backend(format!("redis connection checkout failed: {error}"))
}

fn map_command_error(command: &str, error: RedisError) -> OptimizationCacheError {
    OptimizationCacheError::backend(format!("redis {command} failed: {error}"))
}

fn decode_entry(payload: &str) -> Result<CacheEntry, OptimizationCacheError> {
    serde_json::from_str(payload)
        .map_err(|error| OptimizationCacheError::serialization(error.to_string()))
}

fn encode_entry(entry: &CacheEntry) -> Result<String, OptimizationCacheError> {
    serde_json::to_string(entry)
        .map_err(|error| OptimizationCacheError::serialization(error.to_string()))
}

#[async_trait]
impl OptimizationCache for RedisOptimizationCache {
    async fn get(&self, route_id: &RouteId) -> Result<Option<CacheEntry>, OptimizationCacheError> {
        let key = self.key(route_id);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let payload: Option<String> = redis::cmd("GET")
            .arg(&key)
            .query_async(&mut *conn)
            .await
            .map_err(|error| map_command_error("GET", error))?;

        debug!(route_id = %route_id, hit = payload.is_some(), "redis optimisation cache lookup");
        payload.as_deref().map(decode_entry).transpose()
    }

    async fn put(
        &self,
        route_id: &RouteId,
        stops_fingerprint: &StopsFingerprint,
        result: &OptimizedResult,
    ) -> Result<(), OptimizationCacheError> {
        let entry = CacheEntry::new(route_id, stops_fingerprint, result, self.clock.utc());
        let payload = encode_entry(&entry)?;
        let key = self.key(route_id);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        redis::cmd("SET")
            .arg(&key)
            .arg(payload)
            .query_async::<()>(&mut *conn)
            .await
            .map_err(|error| map_command_error("SET", error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RouteSummary, SequencedStop, Stop, StopId};
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn keys_are_stable_and_prefixed() {
        let route_id = RouteId::new("route-42").expect("route id");
        let first = redis_cache_key("p", &route_id);
        let second = redis_cache_key("p", &route_id);
        assert_eq!(first, second);
        assert!(first.starts_with("p:"));
        assert!(first[2..].chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, redis_cache_key("p", &RouteId::new("route-43").expect("id")));
    }

    #[rstest]
    fn entries_survive_encoding() {
        let stop_a = Stop::new(StopId::new("a").expect("id"), -19.9, -43.9);
        let entry = CacheEntry {
            route_id: RouteId::new("route-42").expect("route id"),
            stops_fingerprint: StopsFingerprint::of(&[stop_a]),
            order: vec![SequencedStop {
                id: StopId::new("a").expect("id"),
                sequence: 1,
                latitude: -19.9,
                longitude: -43.9,
            }],
            etas: [(StopId::new("a").expect("id"), 0)].into_iter().collect(),
            summary: RouteSummary {
                total_distance_meters: 0,
                polyline: None,
                used_live_traffic: false,
            },
            cached_at: Utc
                .with_ymd_and_hms(2026, 5, 1, 12, 0, 0)
                .single()
                .expect("timestamp"),
        };

        let payload = encode_entry(&entry).expect("encode");
        let value: serde_json::Value = serde_json::from_str(&payload).expect("json");
        assert_eq!(value["cachedAt"], json!("2026-05-01T12:00:00Z"));
        assert_eq!(value["stopsFingerprint"].as_str().map(str::len), Some(64));
        assert_eq!(decode_entry(&payload).expect("decode"), entry);
    }

    #[rstest]
    fn entries_without_a_fingerprint_match_no_stops() {
        let payload = r#"{
            "routeId": "route-42",
            "order": [],
            "etas": {},
            "cachedAt": "2026-05-01T12:00:00Z"
        }"#;
        let entry = decode_entry(payload).expect("older payloads still decode");
        let stops = [Stop::new(StopId::new("a").expect("id"), 0.0, 0.0)];
        assert!(!entry.matches(&StopsFingerprint::of(&stops)));
        assert_eq!(entry.summary, RouteSummary::default());
    }

    #[rstest]
    #[case("not json")]
    #[case(r#"{"routeId":"r","order":[],"etas":{}}"#)]
    fn corrupt_payloads_are_serialisation_errors(#[case] payload: &str) {
        assert!(matches!(
            decode_entry(payload),
            Err(OptimizationCacheError::Serialization { .. })
        ));
    }
}
