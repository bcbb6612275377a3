//! JSON encoding of cached payloads.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::CacheError;

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, CacheError> {
    Ok(serde_json::to_string(value)?)
}

pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<T, CacheError> {
    Ok(serde_json::from_str(raw)?)
}
