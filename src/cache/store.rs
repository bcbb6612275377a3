//! CacheStore trait definition and the atomic write batch it executes.

use async_trait::async_trait;

use crate::cache::CacheError;

/// Trait for the key-value store the caches are layered on.
///
/// All store backends must implement this trait. Flat keys use the plain
/// string commands; buckets are hashes and only expire as a whole.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// A short backend name used in logs ("redis", "memory", "noop").
    fn name(&self) -> &'static str;

    /// Get a flat value.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Set a flat value that expires after `ttl_seconds`.
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError>;

    /// Delete a flat key or a whole bucket. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Read several fields of a bucket.
    ///
    /// The result has one slot per requested field, in request order, with
    /// `None` for fields (or buckets) that don't exist.
    async fn hash_get(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>, CacheError>;

    /// Remove fields from a bucket.
    async fn hash_delete(&self, key: &str, fields: &[&str]) -> Result<(), CacheError>;

    /// Apply every operation of the batch as one unit.
    ///
    /// Concurrent readers observe either none or all of the batch.
    async fn execute(&self, batch: WriteBatch) -> Result<(), CacheError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), CacheError>;
}

/// Guard applied to an expiry update, mirroring the `EXPIRE` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireCondition {
    /// Always set the expiry.
    Always,
    /// Only set it when the key has no expiry yet (`NX`).
    IfNoExpiry,
    /// Only set it when it moves the expiry later (`GT`).
    IfGreater,
}

impl ExpireCondition {
    /// The `EXPIRE` flag for this condition, if any.
    pub fn flag(&self) -> Option<&'static str> {
        match self {
            ExpireCondition::Always => None,
            ExpireCondition::IfNoExpiry => Some("NX"),
            ExpireCondition::IfGreater => Some("GT"),
        }
    }
}

/// One write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Set fields of a bucket.
    HashSet {
        key: String,
        fields: Vec<(String, String)>,
    },
    /// Update the expiry of a key.
    Expire {
        key: String,
        ttl_seconds: u64,
        condition: ExpireCondition,
    },
}

/// An ordered sequence of writes applied atomically by [`CacheStore::execute`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash_set<K, F, V>(mut self, key: K, fields: impl IntoIterator<Item = (F, V)>) -> Self
    where
        K: Into<String>,
        F: Into<String>,
        V: Into<String>,
    {
        self.ops.push(WriteOp::HashSet {
            key: key.into(),
            fields: fields
                .into_iter()
                .map(|(f, v)| (f.into(), v.into()))
                .collect(),
        });
        self
    }

    pub fn expire(
        mut self,
        key: impl Into<String>,
        ttl_seconds: u64,
        condition: ExpireCondition,
    ) -> Self {
        self.ops.push(WriteOp::Expire {
            key: key.into(),
            ttl_seconds,
            condition,
        });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}
