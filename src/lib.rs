//! Stash Library
//!
//! A caching facade over pluggable storage drivers (memory, disk, redis,
//! memcached) with key namespacing, friendly expirations, sliding TTLs and
//! read-time validators.

pub mod cache;
pub mod config;
pub mod logger;

pub use cache::{Cache, CacheError, CacheOptions, create_cache};
pub use config::{ConfigLoader, Settings};

pub fn pkg_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
