//! Key-value cache port
//!
//! Services depend on [`CacheStore`] (raw `get`/`set with TTL`/`del`) and talk to
//! it through [`JsonCache`], which handles serialization and metrics. Two
//! backends are provided:
//! - [`RedisCache`]: shared cache for multi-instance deployments
//! - [`InMemoryCache`]: process-local cache for development and tests

mod error;
mod keys;
mod memory;
mod metrics;
mod redis_cache;

pub use error::{CacheError, CacheResult};
pub use keys::{CacheKey, CACHE_VERSION};
pub use memory::InMemoryCache;
pub use metrics::CacheMetrics;
pub use redis_cache::RedisCache;

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Raw cache operations over string payloads
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value; expired entries are reported as absent
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>>;

    /// Set a value that expires after `ttl`
    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Delete a key from cache
    async fn del(&self, key: &str) -> CacheResult<()>;
}

/// Typed JSON facade over a [`CacheStore`]
#[derive(Clone)]
pub struct JsonCache {
    store: Arc<dyn CacheStore>,
    metrics: CacheMetrics,
}

impl JsonCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            metrics: CacheMetrics::new(),
        }
    }

    /// Get a value from cache
    ///
    /// Entries that fail to deserialize are deleted and reported as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let raw = match self.store.get_raw(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache get error");
                self.metrics.record_error(key, "backend");
                return Err(e);
            }
        };

        let Some(data) = raw else {
            debug!(key = %key, "Cache miss");
            self.metrics.record_miss(key);
            return Ok(None);
        };

        match serde_json::from_str::<T>(&data) {
            Ok(value) => {
                debug!(key = %key, "Cache hit");
                self.metrics.record_hit(key);
                Ok(Some(value))
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache deserialization failed");
                self.metrics.record_error(key, "deserialize");
                let _ = self.store.del(key).await;
                Ok(None)
            }
        }
    }

    /// Set a value in cache with TTL
    pub async fn set<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> CacheResult<()> {
        let data = serde_json::to_string(value)?;
        self.store.set_raw(key, data, ttl).await.map_err(|e| {
            self.metrics.record_error(key, "backend");
            e
        })?;

        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache set");
        self.metrics.record_write(key);
        Ok(())
    }
}
