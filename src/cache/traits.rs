//! CacheDriver trait definition.

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::CacheError;
use crate::cache::options::{CacheOptions, Descriptor};

/// Result of a driver write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The entry was stored.
    Stored,
    /// The expiration was not positive, so any existing entry was deleted
    /// and nothing was stored.
    Evicted,
}

impl WriteOutcome {
    pub fn is_stored(self) -> bool {
        matches!(self, WriteOutcome::Stored)
    }
}

/// Trait for storage drivers.
///
/// Drivers own all persisted state. Keys passed in are already derived by
/// the [`Cache`](crate::cache::Cache) facade.
#[async_trait]
pub trait CacheDriver: Send + Sync {
    /// Store `payload` under `key` with the expiration and validators in
    /// `descriptor`.
    async fn write(
        &self,
        key: &str,
        payload: Value,
        descriptor: &Descriptor,
    ) -> Result<WriteOutcome, CacheError>;

    /// Read a payload, renewing sliding entries and evicting entries whose
    /// validators fail.
    async fn read(&self, key: &str) -> Result<Option<Value>, CacheError>;

    /// Delete an entry. Returns `true` if something was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Remove every entry of the backend, not only those of one prefix.
    ///
    /// Does nothing and returns `false` unless `options.all` is set.
    async fn clear(&self, options: &CacheOptions) -> Result<bool, CacheError>;

    /// Per-key lock hook. No driver provides mutual exclusion.
    async fn lock(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}
