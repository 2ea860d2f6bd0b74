//! Stored representation of a cache entry.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::options::Descriptor;
use crate::cache::validator::Validator;
use crate::cache::CacheError;

/// Payload plus the metadata needed to re-validate it on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub payload: Value,
    /// Sliding window in seconds, present only for shifted entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Envelope {
    pub fn new(payload: Value, descriptor: &Descriptor) -> Self {
        Self {
            payload,
            ttl: descriptor.sliding_ttl(),
            validators: descriptor.validators.clone(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CacheError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CacheError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Current Unix time in seconds.
pub fn now_seconds() -> i64 {
    jiff::Timestamp::now().as_second()
}

/// Absolute Unix time `ttl` seconds from now.
pub fn expires_at(ttl: u64) -> i64 {
    now_seconds().saturating_add(i64::try_from(ttl).unwrap_or(i64::MAX))
}
