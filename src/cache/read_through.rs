//! The fetch-or-compute routine shared by the flat and bucketed caches.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::{CacheError, codec};

/// Run one read-through cycle.
///
/// `lookup` is awaited first. A hit is decoded and returned. A miss, a failed
/// read or an undecodable payload calls `producer`; its value is encoded and
/// handed to `write`, and returned only once the write has completed.
/// Producer errors come back untouched and skip the write.
pub(crate) async fn read_through<T, E, L, F, Fut, W, WFut>(
    scope: &str,
    key: &str,
    lookup: L,
    producer: F,
    write: W,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    E: From<CacheError>,
    L: Future<Output = Result<Option<String>, CacheError>>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    W: FnOnce(String) -> WFut,
    WFut: Future<Output = Result<String, CacheError>>,
{
    match lookup.await {
        Ok(Some(raw)) => match codec::decode::<T>(&raw) {
            Ok(value) => {
                tracing::debug!(scope, key, "cache hit");
                return Ok(value);
            }
            Err(e) => {
                tracing::warn!(scope, key, error = %e, "discarding undecodable cached value");
            }
        },
        Ok(None) => tracing::debug!(scope, key, "cache miss"),
        Err(e) => {
            tracing::warn!(scope, key, error = %e, "cache read failed, falling back to producer");
        }
    }

    let value = producer().await?;
    let encoded = codec::encode(&value)?;
    write(encoded).await?;
    tracing::debug!(scope, key, "cached fresh value");

    Ok(value)
}
