//! Settings for building a cache and the logger.
//!
//! [`ConfigLoader`] reads one TOML file (`STASH_CONFIG_FILE`, or
//! `config/default.toml` when present) and overlays `STASH_*` environment
//! variables. The merged [`Settings`] are validated before they are returned.

pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    CacheBackend, CacheConfig, DiskCacheConfig, LoggerSettings, MemcachedCacheConfig,
    RedisCacheConfig, Settings,
};
