//! The `Cache` facade.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::key::storage_key;
use crate::cache::options::{CacheOptions, normalize};
use crate::cache::traits::{CacheDriver, WriteOutcome};
use crate::cache::CacheError;

/// Entry point for cache operations.
///
/// Derives storage keys, normalizes options and delegates to its driver.
/// Holds no state besides the driver handle and the immutable key prefix.
#[derive(Clone)]
pub struct Cache {
    driver: Arc<dyn CacheDriver>,
    prefix: Option<String>,
}

impl Cache {
    /// Create a cache without key prefix.
    pub fn new(driver: Arc<dyn CacheDriver>) -> Self {
        Self {
            driver,
            prefix: None,
        }
    }

    /// Create a cache whose keys are namespaced with `prefix`.
    pub fn with_prefix(driver: Arc<dyn CacheDriver>, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            driver,
            prefix: (!prefix.is_empty()).then_some(prefix),
        }
    }

    pub fn driver(&self) -> &Arc<dyn CacheDriver> {
        &self.driver
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Key used against the driver for `key`.
    pub fn storage_key(&self, key: &str) -> String {
        storage_key(self.prefix(), key)
    }

    /// Store `data` under `key`.
    ///
    /// An expiration that resolves to zero or less deletes the entry instead
    /// and yields [`WriteOutcome::Evicted`].
    pub async fn add<T>(
        &self,
        key: &str,
        data: &T,
        options: CacheOptions,
    ) -> Result<WriteOutcome, CacheError>
    where
        T: Serialize + ?Sized,
    {
        let key = self.storage_key(key);
        let descriptor = normalize(options);
        let payload = serde_json::to_value(data)?;

        if descriptor.is_expired()
            && let Err(e) = self.driver.delete(&key).await
        {
            tracing::debug!(key = %key, error = %e, "Pre-write delete failed");
        }

        self.driver.write(&key, payload, &descriptor).await
    }

    /// Fetch the value stored under `key`. Misses, expired and invalidated
    /// entries all yield `None`.
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        match self.driver.read(&self.storage_key(key)).await? {
            Some(payload) => Ok(Some(serde_json::from_value(payload)?)),
            None => Ok(None),
        }
    }

    /// Remove the entry under `key`. Returns `false` if there was none.
    pub async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        self.driver.delete(&self.storage_key(key)).await
    }

    /// Flush the whole backend when `options.all` is set.
    ///
    /// This is not limited to this cache's prefix: every entry the backend
    /// holds is removed.
    pub async fn clean(&self, options: &CacheOptions) -> Result<bool, CacheError> {
        self.driver.clear(options).await
    }

    pub async fn lock(&self, key: &str) -> Result<(), CacheError> {
        self.driver.lock(&self.storage_key(key)).await
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// Errors from `compute` are returned without touching the cache.
    pub async fn remember<T, F, Fut, E>(
        &self,
        key: &str,
        options: CacheOptions,
        compute: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CacheError>,
    {
        if let Some(cached) = self.get(key).await? {
            return Ok(cached);
        }

        let value = compute().await?;
        self.add(key, &value, options).await?;
        Ok(value)
    }
}
