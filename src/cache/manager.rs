//! Cache manager: the root cache and factory for bucket-scoped caches.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::keys::KeySpace;
use crate::cache::memory::MemoryStore;
use crate::cache::noop::NoOpStore;
use crate::cache::redis::RedisStore;
use crate::cache::{BucketCache, CacheError, CacheStore, Clock, FlatCache, SystemClock};
use crate::config::settings::{BucketTtlPolicy, CacheBackend, CacheConfig};

/// Cache manager that owns the store handle.
///
/// Cloning is cheap; every clone and every bucket cache shares one store.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    keys: KeySpace,
    policy: BucketTtlPolicy,
    flat: FlatCache,
    config: CacheConfig,
}

impl CacheManager {
    /// Create a new cache manager with the given configuration.
    ///
    /// If caching is disabled, a NoOpStore is used.
    pub async fn new(config: CacheConfig) -> Result<Self, CacheError> {
        let store: Arc<dyn CacheStore> = if !config.enabled {
            Arc::new(NoOpStore::new())
        } else {
            match config.backend {
                CacheBackend::Memory => Arc::new(MemoryStore::new()),
                CacheBackend::Redis => Arc::new(RedisStore::connect(&config.redis).await?),
            }
        };
        tracing::debug!(store = store.name(), prefix = %config.key_prefix, "Cache store ready");

        Ok(Self::with_store(store, config))
    }

    /// Build a manager around an existing store.
    pub fn with_store(store: Arc<dyn CacheStore>, config: CacheConfig) -> Self {
        let keys = KeySpace::new(config.key_prefix.clone());
        Self {
            flat: FlatCache::new(store.clone(), keys.clone()),
            clock: Arc::new(SystemClock),
            policy: config.bucket_ttl_policy,
            store,
            keys,
            config,
        }
    }

    /// Replace the clock used for bucket expiration.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// A cache scoped to the bucket `name`.
    pub fn for_bucket(&self, name: &str) -> BucketCache {
        BucketCache::new(
            self.store.clone(),
            self.clock.clone(),
            name,
            self.keys.key(name),
            self.policy,
        )
    }

    pub fn flat(&self) -> &FlatCache {
        &self.flat
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub async fn ping(&self) -> Result<(), CacheError> {
        self.store.ping().await
    }

    // ========================================================================
    // FlatCache proxy methods
    // ========================================================================

    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.flat.get(key).await
    }

    pub async fn put(
        &self,
        key: &str,
        value: impl Into<String>,
        ttl_seconds: u64,
    ) -> Result<String, CacheError> {
        self.flat.put(key, value, ttl_seconds).await
    }

    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.flat.invalidate(key).await
    }

    pub async fn cached<T, E, F, Fut>(
        &self,
        key: &str,
        ttl_seconds: u64,
        producer: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.flat.cached(key, ttl_seconds, producer).await
    }
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("store", &self.store.name())
            .field("keys", &self.keys)
            .field("policy", &self.policy)
            .finish()
    }
}
