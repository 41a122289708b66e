//! Response cache
//!
//! The trend engine is a pure function of (dataset, query), so serialized
//! responses can be memoized by query signature for a fixed TTL. Storage is
//! behind the `ResponseCache` trait so the HTTP layer does not care whether
//! entries live in process memory or in Redis.

mod memory;
mod redis;

pub use memory::MemoryCache;
pub use self::redis::{RedisCache, RedisPool};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{CacheBackend, Config};
use crate::error::Result;

/// Key/value store with per-entry expiry
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Fetch a fresh value, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that expires after `ttl`
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}

/// Cache that never stores anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl ResponseCache for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<()> {
        Ok(())
    }
}

/// Build the cache backend selected in the configuration
pub async fn build_cache(config: &Config) -> Result<Arc<dyn ResponseCache>> {
    let cache: Arc<dyn ResponseCache> = match config.cache.backend {
        CacheBackend::Memory => {
            info!(max_entries = config.cache.max_entries, "Using in-memory response cache");
            Arc::new(MemoryCache::new(config.cache.max_entries))
        }
        CacheBackend::Redis => {
            let pool = RedisPool::new(&config.redis)?;
            if let Err(e) = pool.health_check().await {
                warn!(error = %e, "Redis not reachable yet, responses will be computed uncached");
            } else {
                info!(url = %config.redis.url, "Using Redis response cache");
            }
            Arc::new(RedisCache::new(&pool))
        }
        CacheBackend::Disabled => {
            info!("Response cache disabled");
            Arc::new(NoopCache)
        }
    };
    Ok(cache)
}
