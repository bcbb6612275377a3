//! Redis store implementation using bb8 connection pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError};

use crate::cache::store::{WriteBatch, WriteOp};
use crate::cache::{CacheError, CacheStore};
use crate::config::settings::RedisCacheConfig;

type RedisPool = Pool<Client>;

/// Redis-backed store with bb8 connection pool.
///
/// Buckets are Redis hashes; batches run as `MULTI`/`EXEC` pipelines.
pub struct RedisStore {
    pool: RedisPool,
}

impl RedisStore {
    /// Build the pool and probe the server once.
    ///
    /// An unreachable server is only logged: connections are opened lazily,
    /// so the store starts working as soon as Redis comes back.
    pub async fn connect(config: &RedisCacheConfig) -> Result<Self, CacheError> {
        let client = config
            .connection_info()
            .and_then(Client::open)
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(Duration::from_secs(config.connection_timeout))
            .build_unchecked(client);

        let store = Self { pool };
        match store.ping().await {
            Ok(()) => tracing::info!(host = %config.host, port = config.port, "Connected to redis"),
            Err(e) => tracing::warn!(
                host = %config.host,
                port = config.port,
                error = %e,
                "Redis unreachable at startup, continuing"
            ),
        }

        Ok(store)
    }

    async fn get_conn(&self) -> Result<PooledConnection<'_, Client>, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }
}

/// Translate a batch into one atomic pipeline.
fn pipeline(batch: WriteBatch) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic();

    for op in batch.into_ops() {
        match op {
            WriteOp::HashSet { key, fields } => {
                pipe.cmd("HSET").arg(key).arg(fields).ignore();
            }
            WriteOp::Expire {
                key,
                ttl_seconds,
                condition,
            } => {
                let cmd = pipe.cmd("EXPIRE").arg(key).arg(ttl_seconds);
                if let Some(flag) = condition.flag() {
                    cmd.arg(flag);
                }
                cmd.ignore();
            }
        }
    }

    pipe
}

#[async_trait]
impl CacheStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        conn_ref.get(key).await.map_err(|e: RedisError| e.into())
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        conn_ref
            .set_ex::<_, _, ()>(key, value, ttl_seconds)
            .await
            .map_err(CacheError::from)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        conn_ref.del::<_, ()>(key).await.map_err(CacheError::from)
    }

    async fn hash_get(&self, key: &str, fields: &[&str]) -> Result<Vec<Option<String>>, CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let values: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(key)
            .arg(fields)
            .query_async(conn_ref)
            .await
            .map_err(|e: RedisError| CacheError::from(e))?;
        Ok(values)
    }

    async fn hash_delete(&self, key: &str, fields: &[&str]) -> Result<(), CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        conn_ref.hdel::<_, _, ()>(key, fields).await.map_err(CacheError::from)
    }

    async fn execute(&self, batch: WriteBatch) -> Result<(), CacheError> {
        if batch.is_empty() {
            return Ok(());
        }
        let pipe = pipeline(batch);
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let () = pipe
            .query_async(conn_ref)
            .await
            .map_err(|e: RedisError| CacheError::from(e))?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        let _: String = redis::cmd("PING")
            .query_async(conn_ref)
            .await
            .map_err(|e: RedisError| CacheError::from(e))?;
        Ok(())
    }
}
