//! Memcached driver.
//!
//! The `memcache` client is blocking, so every call runs on the blocking
//! thread pool. Keys are URL-encoded because memcached rejects whitespace and
//! control characters.

use std::sync::Arc;

use async_trait::async_trait;
use memcache::{Client, MemcacheError};
use serde_json::Value;

use crate::cache::envelope::{Envelope, expires_at};
use crate::cache::options::{CacheOptions, Descriptor};
use crate::cache::traits::{CacheDriver, WriteOutcome};
use crate::cache::validator::ValidatorRunner;
use crate::cache::CacheError;
use crate::config::settings::MemcachedCacheConfig;

/// Longest expiration memcached treats as relative; larger values are read
/// as Unix timestamps.
const MAX_RELATIVE_EXPIRATION: u64 = 60 * 60 * 24 * 30;

/// Memcached-based driver.
pub struct MemcachedDriver {
    client: Arc<Client>,
    key_prefix: String,
    runner: ValidatorRunner,
}

impl MemcachedDriver {
    /// Connect and verify the server answers `version`.
    pub async fn new(
        config: &MemcachedCacheConfig,
        runner: ValidatorRunner,
    ) -> Result<Self, CacheError> {
        let url = config.url();
        let client = tokio::task::spawn_blocking(move || {
            let client = Client::connect(url.as_str())?;
            client.version()?;
            Ok::<_, MemcacheError>(client)
        })
        .await
        .map_err(|e| CacheError::Connection(e.to_string()))?
        .map_err(|e| CacheError::Connection(e.to_string()))?;

        tracing::debug!(host = %config.host, port = config.port, "Connected to memcached");
        Ok(Self {
            client: Arc::new(client),
            key_prefix: config.key_prefix.clone(),
            runner,
        })
    }

    fn encoded_key(&self, key: &str) -> String {
        encode_key(&self.key_prefix, key)
    }

    async fn call<T, F>(&self, op: F) -> Result<T, CacheError>
    where
        T: Send + 'static,
        F: FnOnce(&Client) -> Result<T, MemcacheError> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        tokio::task::spawn_blocking(move || op(&client))
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))?
            .map_err(|e| CacheError::Operation(e.to_string()))
    }
}

/// Memcached rejects whitespace and control characters in keys.
fn encode_key(prefix: &str, key: &str) -> String {
    urlencoding::encode(&format!("{}{}", prefix, key)).into_owned()
}

/// Expiration argument for `set`: relative seconds, 0 for none.
fn set_expiration(ttl: Option<u64>) -> u32 {
    match ttl {
        None => 0,
        Some(ttl) if ttl <= MAX_RELATIVE_EXPIRATION => ttl as u32,
        Some(ttl) => absolute_expiration(ttl),
    }
}

/// Absolute deadline for `touch` on sliding entries. Always a timestamp, so
/// memcached never reads it as relative.
fn touch_expiration(envelope: &Envelope) -> Option<u32> {
    envelope.ttl.map(absolute_expiration)
}

fn absolute_expiration(ttl: u64) -> u32 {
    u32::try_from(expires_at(ttl)).unwrap_or(u32::MAX)
}

#[async_trait]
impl CacheDriver for MemcachedDriver {
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

        let bytes = Envelope::new(payload, descriptor).to_bytes()?;
        let encoded = self.encoded_key(key);
        let expiration = set_expiration(descriptor.native_ttl());

        self.call(move |client| client.set(&encoded, bytes.as_slice(), expiration))
            .await?;
        Ok(WriteOutcome::Stored)
    }

    async fn read(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let encoded = self.encoded_key(key);

        let lookup = encoded.clone();
        let bytes: Option<Vec<u8>> = self
            .call(move |client| client.get::<Vec<u8>>(&lookup))
            .await?;
        let Some(bytes) = bytes else {
            return Ok(None);
        };

        let envelope = match Envelope::from_bytes(&bytes) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(key = %encoded, error = %e, "Discarding undecodable cache entry");
                self.call(move |client| client.delete(&encoded)).await?;
                return Ok(None);
            }
        };

        if let Some(at) = touch_expiration(&envelope) {
            let touched = encoded.clone();
            self.call(move |client| client.touch(&touched, at)).await?;
        }

        if !self.runner.all_valid(&envelope.validators) {
            tracing::debug!(key = %encoded, "Evicting entry that failed validation");
            self.call(move |client| client.delete(&encoded)).await?;
            return Ok(None);
        }

        Ok(Some(envelope.payload))
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let encoded = self.encoded_key(key);
        self.call(move |client| client.delete(&encoded)).await
    }

    async fn clear(&self, options: &CacheOptions) -> Result<bool, CacheError> {
        if !options.all {
            return Ok(false);
        }
        tracing::warn!("Flushing every key of the memcached server");
        self.call(|client| client.flush()).await?;
        Ok(true)
    }
}
