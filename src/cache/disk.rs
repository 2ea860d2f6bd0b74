//! Disk driver with per-entry TTL support.

use async_trait::async_trait;
use cached::IOCached;
use cached::stores::DiskCache as CachedDiskCache;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::cache::envelope::{Envelope, expires_at, now_seconds};
use crate::cache::options::{CacheOptions, Descriptor};
use crate::cache::traits::{CacheDriver, WriteOutcome};
use crate::cache::validator::ValidatorRunner;
use crate::cache::CacheError;
use crate::config::settings::DiskCacheConfig;

#[derive(Serialize, Deserialize)]
struct DiskEntry {
    envelope: Envelope,
    expires_at: Option<i64>, // Unix timestamp in seconds
}

impl DiskEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| now_seconds() >= exp)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, CacheError> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Disk-based driver with per-entry TTL.
pub struct DiskDriver {
    store: Mutex<CachedDiskCache<String, Vec<u8>>>,
    runner: ValidatorRunner,
}

impl DiskDriver {
    pub fn new(config: &DiskCacheConfig, runner: ValidatorRunner) -> Result<Self, CacheError> {
        // No store lifespan: expiry is tracked per entry in DiskEntry
        let store = CachedDiskCache::new(&config.name)
            .set_disk_directory(&config.directory)
            .build()
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(Self {
            store: Mutex::new(store),
            runner,
        })
    }
}

#[async_trait]
impl CacheDriver for DiskDriver {
    async fn write(
        &self,
        key: &str,
        payload: Value,
        descriptor: &Descriptor,
    ) -> Result<WriteOutcome, CacheError> {
        if descriptor.is_expired() {
            self.delete(key).await?;
            return Ok(WriteOutcome::Evicted);
        }

        let entry = DiskEntry {
            envelope: Envelope::new(payload, descriptor),
            expires_at: descriptor.native_ttl().map(expires_at),
        };
        let bytes = entry.to_bytes()?;

        let store = self.store.lock().await;
        store
            .cache_set(key.to_string(), bytes)
            .map_err(|e| CacheError::Operation(e.to_string()))?;
        Ok(WriteOutcome::Stored)
    }

    async fn read(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let key_string = key.to_string();
        let store = self.store.lock().await;

        let Some(bytes) = store
            .cache_get(&key_string)
            .map_err(|e| CacheError::Operation(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut entry = match serde_json::from_slice::<DiskEntry>(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                store
                    .cache_remove(&key_string)
                    .map_err(|e| CacheError::Operation(e.to_string()))?;
                return Ok(None);
            }
        };

        if entry.is_expired() {
            store
                .cache_remove(&key_string)
                .map_err(|e| CacheError::Operation(e.to_string()))?;
            return Ok(None);
        }

        if let Some(ttl) = entry.envelope.ttl {
            entry.expires_at = Some(expires_at(ttl));
            store
                .cache_set(key_string.clone(), entry.to_bytes()?)
                .map_err(|e| CacheError::Operation(e.to_string()))?;
        }

        if !self.runner.all_valid(&entry.envelope.validators) {
            tracing::debug!(key, "Evicting entry that failed validation");
            store
                .cache_remove(&key_string)
                .map_err(|e| CacheError::Operation(e.to_string()))?;
            return Ok(None);
        }

        Ok(Some(entry.envelope.payload))
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let key_string = key.to_string();
        let store = self.store.lock().await;
        let removed = store
            .cache_remove(&key_string)
            .map_err(|e| CacheError::Operation(e.to_string()))?;

        Ok(removed
            .and_then(|bytes| serde_json::from_slice::<DiskEntry>(&bytes).ok())
            .is_some_and(|entry| !entry.is_expired()))
    }

    async fn clear(&self, options: &CacheOptions) -> Result<bool, CacheError> {
        if !options.all {
            return Ok(false);
        }

        let store = self.store.lock().await;
        let db = store.connection();

        // Use sled's clear (more efficient than iterating)
        db.clear()
            .map_err(|e| CacheError::Operation(e.to_string()))?;
        db.flush()
            .map_err(|e| CacheError::Operation(e.to_string()))?;
        Ok(true)
    }
}
