//! Key naming shared by the flat and bucketed caches.

use crate::cache::CacheError;

/// Suffix of the field holding a bucket member's expiration timestamp.
pub const EXPIRATION_SUFFIX: &str = ":expiration";

/// Name of the field guarding `key` inside its bucket.
pub fn expiration_field(key: &str) -> String {
    format!("{key}{EXPIRATION_SUFFIX}")
}

/// Applies the configured prefix to flat keys and bucket names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySpace {
    prefix: Option<String>,
}

impl KeySpace {
    /// An empty prefix means keys are stored as given.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: (!prefix.is_empty()).then_some(prefix),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn key(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{name}"),
            None => name.to_string(),
        }
    }
}

pub(crate) fn check_key(key: &str) -> Result<(), CacheError> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Bucket members may not alias another member's expiration field.
pub(crate) fn check_member_key(key: &str) -> Result<(), CacheError> {
    check_key(key)?;
    if key.ends_with(EXPIRATION_SUFFIX) {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub(crate) fn check_ttl(ttl_seconds: u64) -> Result<(), CacheError> {
    if ttl_seconds == 0 {
        return Err(CacheError::InvalidTtl(ttl_seconds));
    }
    Ok(())
}
