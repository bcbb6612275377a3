//! NoOp store implementation.
//!
//! Used when caching is disabled. All operations are no-ops.

use async_trait::async_trait;

use crate::cache::store::WriteBatch;
use crate::cache::{CacheError, CacheStore};

/// A no-operation store that doesn't keep anything.
///
/// Used when `cache.enabled = false` in configuration: every read misses, so
/// `cached` always runs its producer.
#[derive(Debug)]
pub struct NoOpStore;

impl NoOpStore {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for NoOpStore {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set_ex(&self, _key: &str, _value: &str, _ttl_seconds: u64) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    async fn hash_get(&self, _key: &str, fields: &[&str]) -> Result<Vec<Option<String>>, CacheError> {
        Ok(vec![None; fields.len()])
    }

    async fn hash_delete(&self, _key: &str, _fields: &[&str]) -> Result<(), CacheError> {
        Ok(())
    }

    async fn execute(&self, _batch: WriteBatch) -> Result<(), CacheError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
