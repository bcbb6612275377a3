//! Cache-aside helpers over a remote key-value store.
//!
//! Two caches share one store handle:
//! - [`FlatCache`] keeps each entry in its own expiring key.
//! - [`BucketCache`] keeps entries as members of a named bucket (a Redis
//!   hash). The store only expires whole buckets, so each member carries an
//!   expiration field that is checked on every read.
//!
//! # Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! backend = "redis"           # or "memory"
//! key_prefix = "svc"
//! bucket_ttl_policy = "last_write"  # or "longest"
//!
//! [cache.redis]
//! host = "127.0.0.1"
//! port = 6379
//! db = 0
//! pool_size = 4
//! connection_timeout = 5
//! tls_enabled = false
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let cache = CacheManager::new(settings.cache).await?;
//!
//! let user: User = cache
//!     .cached("user:42", 60, || async { repo.find_user(42).await })
//!     .await?;
//!
//! let orders = cache.for_bucket("orders");
//! orders.put("o1", serde_json::to_string(&order)?, 5).await?;
//! orders.invalidate_all().await?;
//! ```

mod bucket;
mod clock;
pub mod codec;
mod error;
mod flat;
pub mod keys;
mod manager;
mod memory;
mod noop;
mod read_through;
mod redis;
mod store;


pub use bucket::BucketCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::CacheError;
pub use flat::FlatCache;
pub use manager::CacheManager;
pub use memory::MemoryStore;
pub use noop::NoOpStore;
pub use redis::RedisStore;
pub use store::{CacheStore, ExpireCondition, WriteBatch, WriteOp};

// Re-export config types
pub use crate::config::settings::{BucketTtlPolicy, CacheBackend, CacheConfig, RedisCacheConfig};
