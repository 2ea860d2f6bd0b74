//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{
    CacheConfig, DiskCacheConfig, LoggerSettings, MemcachedCacheConfig, RedisCacheConfig,
    Settings,
};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// URL schemes accepted by the redis client
const VALID_REDIS_SCHEMES: &[&str] = &["redis://", "rediss://", "redis+unix://", "unix://"];

impl DiskCacheConfig {
    /// Validate disk cache configuration
    ///
    /// # Validation Rules
    /// - Directory must not be empty
    /// - Store name must not be empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directory.trim().is_empty() {
            return Err(ConfigError::invalid(
                "cache.disk.directory",
                "Cache directory is required when using the disk backend.",
            ));
        }

        if self.name.trim().is_empty() {
            return Err(ConfigError::invalid(
                "cache.disk.name",
                "Cache name must not be empty.",
            ));
        }

        Ok(())
    }
}

impl RedisCacheConfig {
    /// Validate redis cache configuration
    ///
    /// # Validation Rules
    /// - URL must use a redis scheme
    /// - Pool size must be greater than 0
    /// - Connection timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_REDIS_SCHEMES
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
        {
            return Err(ConfigError::invalid(
                "cache.redis.url",
                format!(
                    "Invalid redis URL '{}'. Expected format: redis://[user:password@]host[:port][/db]",
                    self.url
                ),
            ));
        }

        if self.pool_size == 0 {
            return Err(ConfigError::invalid(
                "cache.redis.pool_size",
                "Pool size must be greater than 0.",
            ));
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::invalid(
                "cache.redis.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl MemcachedCacheConfig {
    /// Validate memcached cache configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::invalid(
                "cache.memcached.host",
                "Memcached host is required.",
            ));
        }

        if self.port == 0 {
            return Err(ConfigError::invalid(
                "cache.memcached.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        Ok(())
    }
}

impl CacheConfig {
    /// Validate every backend section, selected or not
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.disk.validate()?;
        self.redis.validate()?;
        self.memcached.validate()?;
        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                "logger.level",
                format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::invalid(
                "logger.format",
                format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_field(result: Result<(), ConfigError>, expected: &str) {
        let err = result.unwrap_err();
        assert_eq!(err.field(), Some(expected), "unexpected error: {err}");
    }

    // ========================================================================
    // Cache validation tests
    // ========================================================================

    #[test]
    fn test_default_settings_are_valid() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_disk_config_empty_directory() {
        let config = DiskCacheConfig {
            directory: "  ".to_string(),
            ..Default::default()
        };
        assert_field(config.validate(), "cache.disk.directory");
    }

    #[test]
    fn test_disk_config_empty_name() {
        let config = DiskCacheConfig {
            name: String::new(),
            ..Default::default()
        };
        assert_field(config.validate(), "cache.disk.name");
    }

    #[test]
    fn test_redis_config_valid_url_schemes() {
        let valid_urls = [
            "redis://localhost",
            "redis://:secret@localhost:6380/2",
            "rediss://cache.example.com",
            "redis+unix:///tmp/redis.sock",
            "unix:///tmp/redis.sock",
        ];

        for url in valid_urls {
            let config = RedisCacheConfig {
                url: url.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "URL should be valid: {}", url);
        }
    }

    #[test]
    fn test_redis_config_invalid_url() {
        let config = RedisCacheConfig {
            url: "memcache://localhost".to_string(),
            ..Default::default()
        };
        assert_field(config.validate(), "cache.redis.url");
    }

    #[test]
    fn test_redis_config_zero_pool_size() {
        let config = RedisCacheConfig {
            pool_size: 0,
            ..Default::default()
        };
        assert_field(config.validate(), "cache.redis.pool_size");
    }

    #[test]
    fn test_redis_config_zero_timeout() {
        let config = RedisCacheConfig {
            connection_timeout: 0,
            ..Default::default()
        };
        assert_field(config.validate(), "cache.redis.connection_timeout");
    }

    #[test]
    fn test_memcached_config_invalid() {
        let config = MemcachedCacheConfig {
            port: 0,
            ..Default::default()
        };
        assert_field(config.validate(), "cache.memcached.port");

        let config = MemcachedCacheConfig {
            host: String::new(),
            ..Default::default()
        };
        assert_field(config.validate(), "cache.memcached.host");
    }

    #[test]
    fn test_settings_report_nested_cache_errors() {
        let mut settings = Settings::default();
        settings.cache.redis.pool_size = 0;
        assert_field(settings.validate(), "cache.redis.pool_size");
    }

    // ========================================================================
    // LoggerSettings validation tests
    // ========================================================================

    #[test]
    fn test_logger_settings_levels() {
        for level in ["trace", "DEBUG", "Info", "warn", "error"] {
            let settings = LoggerSettings {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "Level should be valid: {}", level);
        }

        let settings = LoggerSettings {
            level: "verbose".to_string(),
            ..Default::default()
        };
        assert_field(settings.validate(), "logger.level");
    }

    #[test]
    fn test_logger_settings_invalid_format() {
        let settings = LoggerSettings {
            format: "pretty".to_string(),
            ..Default::default()
        };
        assert_field(settings.validate(), "logger.format");
    }
}
