//! Cache module providing a facade over pluggable storage drivers.
//!
//! Supported drivers:
//! - Memory cache (in-process, fastest)
//! - Disk cache (persistent, file-based)
//! - Redis cache (distributed, network-based)
//! - Memcached cache (distributed, requires the `memcached` feature)
//!
//! On top of plain get/set the facade adds key namespacing, human readable
//! expirations, sliding expiration and read-time validators such as
//! "the watched file has not changed".
//!
//! # Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! backend = "redis"  # or "memory", "disk", "memcached"
//! prefix = "app"
//! validation_policy = "first_only"
//!
//! [cache.redis]
//! url = "redis://127.0.0.1:6379"
//! pool_size = 4
//! connection_timeout = 5
//! ```
//!
//! # Usage
//!
//! ```ignore
//! let cache = create_cache(&settings.cache).await?;
//!
//! cache
//!     .add("routes", &routes, CacheOptions::new().expire("10 minutes").watch_file("routes.yml"))
//!     .await?;
//!
//! let routes: Option<Vec<Route>> = cache.get("routes").await?;
//! ```

mod disk;
mod envelope;
mod error;
mod expiration;
mod facade;
mod key;
mod manager;
#[cfg(feature = "memcached")]
mod memcached;
mod memory;
mod noop;
mod options;
mod redis;
mod traits;
mod validator;

pub use disk::DiskDriver;
pub use envelope::Envelope;
pub use error::CacheError;
pub use expiration::{Expiration, seconds_from_now};
pub use facade::Cache;
pub use key::{PREFIX_SEPARATOR, hash_key, storage_key};
pub use manager::{create_cache, create_cache_with, create_driver};
#[cfg(feature = "memcached")]
pub use memcached::MemcachedDriver;
pub use memory::MemoryDriver;
pub use noop::NoOpDriver;
pub use options::{CacheOptions, Descriptor, normalize};
pub use self::redis::RedisDriver;
pub use traits::{CacheDriver, WriteOutcome};
pub use validator::{
    CheckFn, ValidationPolicy, Validator, ValidatorRunner, file_modified, is_file_unchanged,
};

// Re-export config types
pub use crate::config::settings::{
    CacheBackend, CacheConfig, DiskCacheConfig, MemcachedCacheConfig, RedisCacheConfig,
};
