//! Memory driver backed by a concurrent map with per-entry expiration.

use async_trait::async_trait;
use dashmap::DashMap;
use jiff::{SignedDuration, Timestamp};
use serde_json::Value;

use crate::cache::envelope::Envelope;
use crate::cache::options::{CacheOptions, Descriptor};
use crate::cache::traits::{CacheDriver, WriteOutcome};
use crate::cache::validator::ValidatorRunner;
use crate::cache::CacheError;

struct MemoryEntry {
    envelope: Envelope,
    expires_at: Option<Timestamp>,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Timestamp::now() >= at)
    }
}

fn deadline(ttl: u64) -> Option<Timestamp> {
    let ttl = SignedDuration::from_secs(i64::try_from(ttl).unwrap_or(i64::MAX));
    Timestamp::now().checked_add(ttl).ok()
}

/// In-process driver. Expired entries are evicted lazily on access.
#[derive(Default)]
pub struct MemoryDriver {
    entries: DashMap<String, MemoryEntry>,
    runner: ValidatorRunner,
}

impl MemoryDriver {
    pub fn new(runner: ValidatorRunner) -> Self {
        Self {
            entries: DashMap::new(),
            runner,
        }
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove `key` only if it still holds `stale`. An entry rewritten since
    /// it was validated is left alone.
    fn evict_stale(&self, key: &str, stale: &Envelope) -> bool {
        self.entries
            .remove_if(key, |_, entry| entry.envelope == *stale)
            .is_some()
    }
}

#[async_trait]
impl CacheDriver for MemoryDriver {
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

        let entry = MemoryEntry {
            envelope: Envelope::new(payload, descriptor),
            expires_at: descriptor.native_ttl().and_then(deadline),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(WriteOutcome::Stored)
    }

    async fn read(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let envelope = {
            let Some(mut entry) = self.entries.get_mut(key) else {
                return Ok(None);
            };
            if entry.is_expired() {
                drop(entry);
                self.entries.remove_if(key, |_, entry| entry.is_expired());
                return Ok(None);
            }
            if let Some(ttl) = entry.envelope.ttl {
                entry.expires_at = deadline(ttl);
            }
            entry.envelope.clone()
        };

        if !self.runner.all_valid(&envelope.validators) {
            tracing::debug!(key, "Evicting entry that failed validation");
            self.evict_stale(key, &envelope);
            return Ok(None);
        }

        Ok(Some(envelope.payload))
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| !entry.is_expired()))
    }

    async fn clear(&self, options: &CacheOptions) -> Result<bool, CacheError> {
        if !options.all {
            return Ok(false);
        }
        self.entries.clear();
        Ok(true)
    }
}
