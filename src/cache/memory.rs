//! In-process store with Redis-like key and hash semantics.
//!
//! Physical expiry is driven by a [`Clock`], so tests can move time forward
//! without sleeping. Every command takes the same lock, which makes a
//! [`WriteBatch`] atomic with respect to any concurrent reader.
//!
//! Expired keys are dropped when they are next touched, and every
//! [`SWEEP_INTERVAL`] writes a sweep reclaims the ones nobody reads again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::cache::store::{ExpireCondition, WriteBatch, WriteOp};
use crate::cache::{CacheError, CacheStore, Clock, SystemClock};

/// Writes between two sweeps of expired keys.
pub const SWEEP_INTERVAL: u64 = 1024;

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    /// Unix second at which the key disappears.
    expires_at: Option<i64>,
}

impl Slot {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-memory store.
#[derive(Debug)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, Slot>>,
    clock: Arc<dyn Clock>,
    writes: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            clock,
            writes: AtomicU64::new(0),
        }
    }

    /// Seconds until `key` expires; `None` if it is missing or has no expiry.
    pub fn ttl(&self, key: &str) -> Result<Option<i64>, CacheError> {
        let now = self.clock.now();
        let mut slots = self.lock()?;
        Ok(live_slot(&mut slots, key, now)
            .and_then(|slot| slot.expires_at)
            .map(|at| at - now))
    }

    /// Whether `key` currently exists, whatever its type.
    pub fn contains(&self, key: &str) -> Result<bool, CacheError> {
        let now = self.clock.now();
        let mut slots = self.lock()?;
        Ok(live_slot(&mut slots, key, now).is_some())
    }

    /// Number of fields in a bucket, expiration fields included.
    pub fn hash_len(&self, key: &str) -> Result<usize, CacheError> {
        let now = self.clock.now();
        let mut slots = self.lock()?;
        match live_slot(&mut slots, key, now) {
            Some(Slot {
                value: Value::Hash(fields),
                ..
            }) => Ok(fields.len()),
            Some(_) => Err(wrong_type(key)),
            None => Ok(0),
        }
    }

    /// Keys held in memory, including expired ones not yet reclaimed.
    pub fn slot_count(&self) -> Result<usize, CacheError> {
        Ok(self.lock()?.len())
    }

    /// Count a write and drop every expired key once per interval.
    fn record_write(&self, slots: &mut HashMap<String, Slot>, now: i64) {
        let writes = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if writes % SWEEP_INTERVAL == 0 {
            let before = slots.len();
            slots.retain(|_, slot| !slot.is_expired(now));
            tracing::trace!(reclaimed = before - slots.len(), "swept expired keys");
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Slot>>, CacheError> {
        self.slots
            .lock()
            .map_err(|e| CacheError::Operation(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Look up `key`, dropping it first if it has expired.
fn live_slot<'a>(slots: &'a mut HashMap<String, Slot>, key: &str, now: i64) -> Option<&'a mut Slot> {
    if slots.get(key).is_some_and(|slot| slot.is_expired(now)) {
        slots.remove(key);
    }
    slots.get_mut(key)
}

fn wrong_type(key: &str) -> CacheError {
    CacheError::Operation(format!(
        "WRONGTYPE Operation against key '{key}' holding the wrong kind of value"
    ))
}

fn expires_at(now: i64, ttl_seconds: u64) -> i64 {
    now.saturating_add_unsigned(ttl_seconds)
}

#[async_trait]
impl CacheStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = self.clock.now();
        let mut slots = self.lock()?;
        match live_slot(&mut slots, key, now) {
            Some(Slot {
                value: Value::Text(text),
                ..
            }) => Ok(Some(text.clone())),
            Some(_) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let now = self.clock.now();
        let mut slots = self.lock()?;
        slots.insert(
            key.to_string(),
            Slot {
                value: Value::Text(value.to_string()),
                expires_at: Some(expires_at(now, ttl_seconds)),
            },
        );
        self.record_write(&mut slots, now);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut slots = self.lock()?;
        slots.remove(key);
        Ok(())
    }

    async fn hash_get(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>, CacheError> {
        let now = self.clock.now();
        let mut slots = self.lock()?;
        match live_slot(&mut slots, key, now) {
            Some(Slot {
                value: Value::Hash(hash),
                ..
            }) => Ok(fields.iter().map(|f| hash.get(*f).cloned()).collect()),
            Some(_) => Err(wrong_type(key)),
            None => Ok(vec![None; fields.len()]),
        }
    }

    async fn hash_delete(&self, key: &str, fields: &[&str]) -> Result<(), CacheError> {
        let now = self.clock.now();
        let mut slots = self.lock()?;
        let emptied = match live_slot(&mut slots, key, now) {
            Some(Slot {
                value: Value::Hash(hash),
                ..
            }) => {
                for field in fields {
                    hash.remove(*field);
                }
                hash.is_empty()
            }
            Some(_) => return Err(wrong_type(key)),
            None => false,
        };
        // Redis removes a hash once its last field is gone
        if emptied {
            slots.remove(key);
        }
        Ok(())
    }

    async fn execute(&self, batch: WriteBatch) -> Result<(), CacheError> {
        let now = self.clock.now();
        let mut slots = self.lock()?;

        // Reject the whole batch up front so nothing is half applied.
        for op in batch.ops() {
            if let WriteOp::HashSet { key, .. } = op
                && let Some(Slot {
                    value: Value::Text(_),
                    ..
                }) = live_slot(&mut slots, key, now)
            {
                return Err(wrong_type(key));
            }
        }

        for op in batch.into_ops() {
            match op {
                WriteOp::HashSet { key, fields } => {
                    let slot = slots.entry(key).or_insert_with(|| Slot {
                        value: Value::Hash(HashMap::new()),
                        expires_at: None,
                    });
                    if let Value::Hash(hash) = &mut slot.value {
                        hash.extend(fields);
                    }
                }
                WriteOp::Expire {
                    key,
                    ttl_seconds,
                    condition,
                } => {
                    let Some(slot) = live_slot(&mut slots, &key, now) else {
                        continue;
                    };
                    let target = expires_at(now, ttl_seconds);
                    let apply = match condition {
                        ExpireCondition::Always => true,
                        ExpireCondition::IfNoExpiry => slot.expires_at.is_none(),
                        // a key without expiry counts as living forever
                        ExpireCondition::IfGreater => slot.expires_at.is_some_and(|at| target > at),
                    };
                    if apply {
                        slot.expires_at = Some(target);
                    }
                }
            }
        }

        self.record_write(&mut slots, now);
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn store() -> (MemoryStore, ManualClock) {
        let clock = ManualClock::new(10_000);
        (MemoryStore::with_clock(Arc::new(clock.clone())), clock)
    }

    #[tokio::test]
    async fn test_set_ex_expires() {
        let (store, clock) = store();
        store.set_ex("k", "v", 2).await.unwrap();
        assert_eq!(store.ttl("k").unwrap(), Some(2));

        clock.advance(2);
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(!store.contains("k").unwrap());
    }

    #[tokio::test]
    async fn test_hash_get_preserves_request_order() {
        let (store, _) = store();
        store
            .execute(WriteBatch::new().hash_set("h", [("a", "1"), ("b", "2")]))
            .await
            .unwrap();

        let values = store.hash_get("h", &["b", "missing", "a"]).await.unwrap();
        assert_eq!(values, vec![Some("2".into()), None, Some("1".into())]);
    }

    #[tokio::test]
    async fn test_hash_get_on_missing_bucket() {
        let (store, _) = store();
        let values = store.hash_get("nope", &["a", "b"]).await.unwrap();
        assert_eq!(values, vec![None, None]);
    }

    #[tokio::test]
    async fn test_hash_delete_last_field_removes_bucket() {
        let (store, _) = store();
        store
            .execute(WriteBatch::new().hash_set("h", [("a", "1")]))
            .await
            .unwrap();

        store.hash_delete("h", &["a"]).await.unwrap();
        assert!(!store.contains("h").unwrap());
    }

    #[tokio::test]
    async fn test_wrong_type_rejects_whole_batch() {
        let (store, _) = store();
        store.set_ex("flat", "v", 10).await.unwrap();

        let batch = WriteBatch::new()
            .hash_set("h", [("a", "1")])
            .hash_set("flat", [("a", "1")]);
        let err = store.execute(batch).await.unwrap_err();

        assert!(matches!(err, CacheError::Operation(msg) if msg.starts_with("WRONGTYPE")));
        assert!(!store.contains("h").unwrap());
        assert_eq!(store.get("flat").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_expire_conditions() {
        let (store, _) = store();
        store
            .execute(WriteBatch::new().hash_set("h", [("a", "1")]))
            .await
            .unwrap();
        assert_eq!(store.ttl("h").unwrap(), None);

        // GT never applies to a key without expiry
        store
            .execute(WriteBatch::new().expire("h", 5, ExpireCondition::IfGreater))
            .await
            .unwrap();
        assert_eq!(store.ttl("h").unwrap(), None);

        store
            .execute(WriteBatch::new().expire("h", 5, ExpireCondition::IfNoExpiry))
            .await
            .unwrap();
        assert_eq!(store.ttl("h").unwrap(), Some(5));

        store
            .execute(WriteBatch::new().expire("h", 3, ExpireCondition::IfGreater))
            .await
            .unwrap();
        assert_eq!(store.ttl("h").unwrap(), Some(5));

        store
            .execute(WriteBatch::new().expire("h", 3, ExpireCondition::Always))
            .await
            .unwrap();
        assert_eq!(store.ttl("h").unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_unread_expired_keys_are_reclaimed() {
        let (store, clock) = store();
        for i in 0..10_000 {
            store.set_ex(&format!("old:{i}"), "v", 1).await.unwrap();
        }
        clock.advance(60);

        for i in 0..SWEEP_INTERVAL {
            store.set_ex(&format!("new:{i}"), "v", 60).await.unwrap();
        }

        assert_eq!(store.slot_count().unwrap(), SWEEP_INTERVAL as usize);
        assert_eq!(store.get("new:0").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_sweep_keeps_live_buckets() {
        let (store, clock) = store();
        store
            .execute(
                WriteBatch::new()
                    .hash_set("h", [("a", "1")])
                    .expire("h", 600, ExpireCondition::Always),
            )
            .await
            .unwrap();
        store.set_ex("short", "v", 1).await.unwrap();
        clock.advance(5);

        for i in 0..SWEEP_INTERVAL {
            store.set_ex(&format!("k:{i}"), "v", 60).await.unwrap();
        }

        assert!(store.contains("h").unwrap());
        assert_eq!(store.slot_count().unwrap(), SWEEP_INTERVAL as usize + 1);
    }

    #[tokio::test]
    async fn test_expire_on_missing_key_is_noop() {
        let (store, _) = store();
        store
            .execute(WriteBatch::new().expire("ghost", 5, ExpireCondition::Always))
            .await
            .unwrap();
        assert!(!store.contains("ghost").unwrap());
    }
}
