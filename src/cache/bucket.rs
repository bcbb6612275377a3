//! Bucketed cache: members of one store hash, each with its own expiration.
//!
//! The store can only expire a hash as a whole, so every member `key` is
//! written together with a `key:expiration` field holding the Unix second
//! after which the member is stale. Reads fetch both fields in one round trip
//! and treat a stale member as a miss. Stale bytes are left in place until they
//! are overwritten, invalidated, or the whole bucket expires.
//!
//! Each write also refreshes the bucket's own TTL. How that TTL relates to the
//! members' TTLs is decided by [`BucketTtlPolicy`]:
//!
//! - `LastWrite` sets the bucket TTL to the TTL of the latest write. A member
//!   written with a long TTL can therefore be evicted early if a shorter-lived
//!   member is written into the same bucket after it.
//! - `Longest` only ever extends the bucket TTL (`EXPIRE NX` + `EXPIRE GT`,
//!   Redis 7+), so the bucket outlives every member still valid.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::keys::{self, expiration_field};
use crate::cache::read_through::read_through;
use crate::cache::store::{ExpireCondition, WriteBatch};
use crate::cache::{BucketTtlPolicy, CacheError, CacheStore, Clock};

/// Cache scoped to one bucket.
#[derive(Clone)]
pub struct BucketCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    name: String,
    bucket_key: String,
    policy: BucketTtlPolicy,
}

impl BucketCache {
    /// `bucket_key` is the name of the hash in the store, prefix included.
    pub fn new(
        store: Arc<dyn CacheStore>,
        clock: Arc<dyn Clock>,
        name: impl Into<String>,
        bucket_key: impl Into<String>,
        policy: BucketTtlPolicy,
    ) -> Self {
        Self {
            store,
            clock,
            name: name.into(),
            bucket_key: bucket_key.into(),
            policy,
        }
    }

    /// Bucket name as given by the caller.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bucket name as stored.
    pub fn bucket_key(&self) -> &str {
        &self.bucket_key
    }

    pub fn policy(&self) -> BucketTtlPolicy {
        self.policy
    }

    /// Get the raw stored value of a member that hasn't expired yet.
    pub async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        keys::check_member_key(key)?;

        let guard = expiration_field(key);
        let mut fields = self
            .store
            .hash_get(&self.bucket_key, &[key, guard.as_str()])
            .await?
            .into_iter();
        let value = fields.next().flatten();
        let expiration = fields.next().flatten();

        let now = self.clock.now();
        let live = live_value(value, expiration.as_deref(), now);
        if live.is_none() {
            tracing::debug!(bucket = %self.name, key, now, expiration = ?expiration, "bucket member absent or expired");
        }
        Ok(live)
    }

    /// Store a member for `ttl_seconds` and hand the value back.
    ///
    /// The member, its expiration field and the bucket TTL update go to the
    /// store as one atomic batch.
    pub async fn put(
        &self,
        key: &str,
        value: impl Into<String>,
        ttl_seconds: u64,
    ) -> Result<String, CacheError> {
        keys::check_member_key(key)?;
        keys::check_ttl(ttl_seconds)?;

        let value = value.into();
        let expiration = self.clock.now().saturating_add_unsigned(ttl_seconds);
        let batch = self.write_batch(key, &value, expiration, ttl_seconds);

        self.store.execute(batch).await?;
        Ok(value)
    }

    /// Remove a member and its expiration field.
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        keys::check_member_key(key)?;
        let guard = expiration_field(key);
        self.store
            .hash_delete(&self.bucket_key, &[key, guard.as_str()])
            .await
    }

    /// Drop the whole bucket regardless of member state.
    pub async fn invalidate_all(&self) -> Result<(), CacheError> {
        self.store.delete(&self.bucket_key).await
    }

    /// Return the member for `key`, or compute, store and return it.
    ///
    /// An expired member counts as a miss exactly like a missing one.
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
        keys::check_member_key(key)?;
        keys::check_ttl(ttl_seconds)?;

        read_through(
            &self.name,
            key,
            self.get(key),
            producer,
            move |value| self.put(key, value, ttl_seconds),
        )
        .await
    }

    fn write_batch(&self, key: &str, value: &str, expiration: i64, ttl_seconds: u64) -> WriteBatch {
        let batch = WriteBatch::new().hash_set(
            self.bucket_key.as_str(),
            [
                (key.to_string(), value.to_string()),
                (expiration_field(key), expiration.to_string()),
            ],
        );

        match self.policy {
            BucketTtlPolicy::LastWrite => {
                batch.expire(self.bucket_key.as_str(), ttl_seconds, ExpireCondition::Always)
            }
            BucketTtlPolicy::Longest => batch
                .expire(self.bucket_key.as_str(), ttl_seconds, ExpireCondition::IfNoExpiry)
                .expire(self.bucket_key.as_str(), ttl_seconds, ExpireCondition::IfGreater),
        }
    }
}

impl std::fmt::Debug for BucketCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketCache")
            .field("name", &self.name)
            .field("bucket_key", &self.bucket_key)
            .field("store", &self.store.name())
            .field("policy", &self.policy)
            .finish()
    }
}

/// Keep `value` only while `now` is strictly before its expiration.
///
/// A missing or unparseable expiration means the member is not trusted.
pub(crate) fn live_value(value: Option<String>, expiration: Option<&str>, now: i64) -> Option<String> {
    let expiration = expiration?.trim().parse::<i64>().ok()?;
    if now < expiration { value } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::WriteOp;

    #[test]
    fn test_live_value_before_expiration() {
        assert_eq!(
            live_value(Some("v".into()), Some("110"), 100),
            Some("v".to_string())
        );
    }

    #[test]
    fn test_live_value_at_expiration_is_stale() {
        assert_eq!(live_value(Some("v".into()), Some("100"), 100), None);
        assert_eq!(live_value(Some("v".into()), Some("99"), 100), None);
    }

    #[test]
    fn test_live_value_without_guard() {
        assert_eq!(live_value(Some("v".into()), None, 100), None);
        assert_eq!(live_value(Some("v".into()), Some("soon"), 100), None);
    }

    #[test]
    fn test_live_value_guard_without_member() {
        assert_eq!(live_value(None, Some("110"), 100), None);
    }

    fn bucket(policy: BucketTtlPolicy) -> BucketCache {
        BucketCache::new(
            Arc::new(crate::cache::NoOpStore::new()),
            Arc::new(crate::cache::ManualClock::new(1_000)),
            "orders",
            "svc:orders",
            policy,
        )
    }

    #[test]
    fn test_last_write_batch() {
        let batch = bucket(BucketTtlPolicy::LastWrite).write_batch("o1", "{}", 1_005, 5);
        assert_eq!(
            batch.into_ops(),
            vec![
                WriteOp::HashSet {
                    key: "svc:orders".into(),
                    fields: vec![
                        ("o1".into(), "{}".into()),
                        ("o1:expiration".into(), "1005".into()),
                    ],
                },
                WriteOp::Expire {
                    key: "svc:orders".into(),
                    ttl_seconds: 5,
                    condition: ExpireCondition::Always,
                },
            ]
        );
    }

    #[test]
    fn test_longest_batch_only_extends() {
        let ops = bucket(BucketTtlPolicy::Longest)
            .write_batch("o1", "{}", 1_005, 5)
            .into_ops();
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[1], WriteOp::Expire { condition: ExpireCondition::IfNoExpiry, .. }));
        assert!(matches!(ops[2], WriteOp::Expire { condition: ExpireCondition::IfGreater, .. }));
    }

    #[tokio::test]
    async fn test_member_key_cannot_alias_guard() {
        let cache = bucket(BucketTtlPolicy::LastWrite);
        let err = cache.put("o1:expiration", "x", 5).await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidKey(_)));
    }
}
