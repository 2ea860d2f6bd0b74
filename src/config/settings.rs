//! Configuration settings structures for stash
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use serde::{Deserialize, Serialize};

use crate::cache::ValidationPolicy;
use crate::config::error::ConfigError;
use crate::logger::{LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "full".to_string()
}

fn default_cache_directory() -> String {
    "cache".to_string()
}

fn default_cache_name() -> String {
    "stash".to_string()
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_redis_pool_size() -> u32 {
    4
}

fn default_redis_connection_timeout() -> u64 {
    5
}

fn default_memcached_host() -> String {
    "127.0.0.1".to_string()
}

fn default_memcached_port() -> u16 {
    11211
}

// ============================================================================
// Logger Configuration
// ============================================================================

/// Logger configuration as it appears in configuration files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: "full", "compact", "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Enable ANSI colors when stdout is a terminal
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            colored: true,
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to LoggerConfig
    ///
    /// This method transforms the configuration file representation into
    /// the runtime LoggerConfig used by the logger module.
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let format = self.parse_format()?;

        LoggerConfig::new(self.level, format, self.colored)
            .map_err(|e| ConfigError::invalid("logger", e.to_string()))
    }

    /// Parse the format string into LogFormat enum
    fn parse_format(&self) -> Result<LogFormat, ConfigError> {
        self.format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::invalid("logger.format", e.to_string()))
    }
}

// ============================================================================
// Cache Configuration
// ============================================================================

/// Cache backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Disk,
    Redis,
    Memcached,
}

/// Disk cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskCacheConfig {
    /// Directory to store cache files
    #[serde(default = "default_cache_directory")]
    pub directory: String,

    /// Name of the store inside `directory`
    #[serde(default = "default_cache_name")]
    pub name: String,
}

impl Default for DiskCacheConfig {
    fn default() -> Self {
        Self {
            directory: default_cache_directory(),
            name: default_cache_name(),
        }
    }
}

/// Redis cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_redis_connection_timeout")]
    pub connection_timeout: u64,

    /// Key prefix for all cache entries
    #[serde(default)]
    pub key_prefix: String,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            connection_timeout: default_redis_connection_timeout(),
            key_prefix: String::new(),
        }
    }
}

/// Memcached cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemcachedCacheConfig {
    #[serde(default = "default_memcached_host")]
    pub host: String,

    #[serde(default = "default_memcached_port")]
    pub port: u16,

    /// Prepended to every key before it is URL-encoded
    #[serde(default)]
    pub key_prefix: String,
}

impl MemcachedCacheConfig {
    /// Connection URL understood by the memcache client
    pub fn url(&self) -> String {
        format!("memcache://{}:{}", self.host, self.port)
    }
}

impl Default for MemcachedCacheConfig {
    fn default() -> Self {
        Self {
            host: default_memcached_host(),
            port: default_memcached_port(),
            key_prefix: String::new(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether caching is enabled; a disabled cache stores nothing
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cache backend type
    #[serde(default)]
    pub backend: CacheBackend,

    /// Namespace prepended to every hashed key
    #[serde(default)]
    pub prefix: Option<String>,

    /// How stored validators are evaluated on read
    #[serde(default)]
    pub validation_policy: ValidationPolicy,

    /// Disk cache settings
    #[serde(default)]
    pub disk: DiskCacheConfig,

    /// Redis cache settings
    #[serde(default)]
    pub redis: RedisCacheConfig,

    /// Memcached cache settings
    #[serde(default)]
    pub memcached: MemcachedCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackend::default(),
            prefix: None,
            validation_policy: ValidationPolicy::default(),
            disk: DiskCacheConfig::default(),
            redis: RedisCacheConfig::default(),
            memcached: MemcachedCacheConfig::default(),
        }
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
///
/// This structure represents the entire configuration that can be loaded
/// from TOML files and environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,
}
