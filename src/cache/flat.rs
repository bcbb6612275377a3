//! Cache over plain expiring keys.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::keys::{self, KeySpace};
use crate::cache::read_through::read_through;
use crate::cache::{CacheError, CacheStore};

/// Log scope of flat-key operations; bucketed ones use the bucket name.
const FLAT_SCOPE: &str = "flat";

/// Cache whose entries are individual store keys.
///
/// Expiration is left entirely to the store: a key set with a TTL simply
/// disappears once it runs out.
#[derive(Clone)]
pub struct FlatCache {
    store: Arc<dyn CacheStore>,
    keys: KeySpace,
}

impl FlatCache {
    pub fn new(store: Arc<dyn CacheStore>, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    /// Get the raw stored value.
    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        keys::check_key(key)?;
        self.store.get(&self.keys.key(key)).await
    }

    /// Store `value` for `ttl_seconds` and hand it back.
    pub async fn put(
        &self,
        key: &str,
        value: impl Into<String>,
        ttl_seconds: u64,
    ) -> Result<String, CacheError> {
        keys::check_key(key)?;
        keys::check_ttl(ttl_seconds)?;

        let value = value.into();
        self.store
            .set_ex(&self.keys.key(key), &value, ttl_seconds)
            .await?;
        Ok(value)
    }

    /// Remove a key. Missing keys are fine.
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        keys::check_key(key)?;
        self.store.delete(&self.keys.key(key)).await
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// A failed read counts as a miss. Errors from `producer` are returned
    /// as-is; a failed write is returned through `E`.
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
        keys::check_key(key)?;
        keys::check_ttl(ttl_seconds)?;

        read_through(
            FLAT_SCOPE,
            key,
            self.get(key),
            producer,
            move |value| self.put(key, value, ttl_seconds),
        )
        .await
    }
}

impl std::fmt::Debug for FlatCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatCache")
            .field("store", &self.store.name())
            .field("keys", &self.keys)
            .finish()
    }
}
