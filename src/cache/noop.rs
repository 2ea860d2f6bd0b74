//! NoOp driver implementation.
//!
//! Used when caching is disabled. All operations are no-ops.

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::options::{CacheOptions, Descriptor};
use crate::cache::traits::{CacheDriver, WriteOutcome};
use crate::cache::CacheError;

/// A no-operation driver that doesn't store anything.
///
/// Used when `cache.enabled = false` in configuration.
pub struct NoOpDriver;

impl NoOpDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheDriver for NoOpDriver {
    async fn write(
        &self,
        _key: &str,
        _payload: Value,
        descriptor: &Descriptor,
    ) -> Result<WriteOutcome, CacheError> {
        if descriptor.is_expired() {
            return Ok(WriteOutcome::Evicted);
        }
        Ok(WriteOutcome::Stored)
    }

    async fn read(&self, _key: &str) -> Result<Option<Value>, CacheError> {
        Ok(None)
    }

    async fn delete(&self, _key: &str) -> Result<bool, CacheError> {
        Ok(false)
    }

    async fn clear(&self, _options: &CacheOptions) -> Result<bool, CacheError> {
        Ok(false)
    }
}
