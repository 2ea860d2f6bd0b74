//! Construction of caches from configuration.

use std::sync::Arc;

use crate::cache::disk::DiskDriver;
use crate::cache::facade::Cache;
use crate::cache::memory::MemoryDriver;
use crate::cache::noop::NoOpDriver;
use crate::cache::redis::RedisDriver;
use crate::cache::validator::ValidatorRunner;
use crate::cache::{CacheDriver, CacheError};
use crate::config::settings::{CacheBackend, CacheConfig, MemcachedCacheConfig};

/// Build the driver selected by `config`.
///
/// If caching is disabled, a NoOpDriver is used. Network drivers connect
/// eagerly and fail here when the server is unreachable.
pub async fn create_driver(
    config: &CacheConfig,
    runner: ValidatorRunner,
) -> Result<Arc<dyn CacheDriver>, CacheError> {
    if !config.enabled {
        tracing::info!("Caching disabled, using no-op driver");
        return Ok(Arc::new(NoOpDriver::new()));
    }

    let driver: Arc<dyn CacheDriver> = match config.backend {
        CacheBackend::Memory => Arc::new(MemoryDriver::new(runner)),
        CacheBackend::Disk => Arc::new(DiskDriver::new(&config.disk, runner)?),
        CacheBackend::Redis => Arc::new(RedisDriver::new(&config.redis, runner).await?),
        CacheBackend::Memcached => memcached_driver(&config.memcached, runner).await?,
    };

    tracing::info!(backend = ?config.backend, "Cache driver ready");
    Ok(driver)
}

/// Build a [`Cache`] using the validation policy from `config`.
pub async fn create_cache(config: &CacheConfig) -> Result<Cache, CacheError> {
    create_cache_with(config, ValidatorRunner::new(config.validation_policy)).await
}

/// Build a [`Cache`] with a caller supplied runner, e.g. one carrying
/// registered external checks.
pub async fn create_cache_with(
    config: &CacheConfig,
    runner: ValidatorRunner,
) -> Result<Cache, CacheError> {
    let driver = create_driver(config, runner).await?;
    Ok(match config.prefix.as_deref() {
        Some(prefix) => Cache::with_prefix(driver, prefix),
        None => Cache::new(driver),
    })
}

#[cfg(feature = "memcached")]
async fn memcached_driver(
    config: &MemcachedCacheConfig,
    runner: ValidatorRunner,
) -> Result<Arc<dyn CacheDriver>, CacheError> {
    let driver = crate::cache::memcached::MemcachedDriver::new(config, runner).await?;
    Ok(Arc::new(driver))
}

#[cfg(not(feature = "memcached"))]
async fn memcached_driver(
    _config: &MemcachedCacheConfig,
    _runner: ValidatorRunner,
) -> Result<Arc<dyn CacheDriver>, CacheError> {
    Err(CacheError::Unavailable(
        "memcached support is not compiled in, enable the `memcached` feature".to_string(),
    ))
}
