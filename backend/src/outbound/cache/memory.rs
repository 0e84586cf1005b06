//! In-process optimisation cache.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::RwLock;

use crate::domain::ports::{CacheEntry, OptimizationCache, OptimizationCacheError};
use crate::domain::{OptimizedResult, RouteId, StopsFingerprint};

/// Optimisation cache held in a process-local map.
///
/// Entries live until overwritten or the process exits.
#[derive(Clone)]
pub struct InMemoryOptimizationCache {
    entries: Arc<RwLock<HashMap<RouteId, CacheEntry>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryOptimizationCache {
    /// Create an empty cache stamping entries with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Number of routes currently cached.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no route is cached.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl OptimizationCache for InMemoryOptimizationCache {
    async fn get(&self, route_id: &RouteId) -> Result<Option<CacheEntry>, OptimizationCacheError> {
        Ok(self.entries.read().await.get(route_id).cloned())
    }

    async fn put(
        &self,
        route_id: &RouteId,
        stops_fingerprint: &StopsFingerprint,
        result: &OptimizedResult,
    ) -> Result<(), OptimizationCacheError> {
        let entry = CacheEntry::new(route_id, stops_fingerprint, result, self.clock.utc());
        self.entries.write().await.insert(route_id.clone(), entry);
        Ok(())
    }
}
