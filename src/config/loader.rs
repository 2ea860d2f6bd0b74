//! Settings loader.
//!
//! Settings come from one TOML file overlaid with `STASH_*` environment
//! variables, where `__` separates nested keys:
//!
//! ```text
//! STASH_CACHE__BACKEND=redis        -> cache.backend
//! STASH_CACHE__REDIS__POOL_SIZE=8   -> cache.redis.pool_size
//! ```

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};

use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Points at the settings file; when set, the file must exist.
pub const CONFIG_FILE_ENV: &str = "STASH_CONFIG_FILE";

/// Read when `STASH_CONFIG_FILE` is unset. Missing is fine: defaults apply.
pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";

const ENV_PREFIX: &str = "STASH";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: PathBuf,
    required: bool,
}

impl ConfigLoader {
    /// Use `STASH_CONFIG_FILE` if set, otherwise the optional default file.
    pub fn new() -> Self {
        match std::env::var_os(CONFIG_FILE_ENV) {
            Some(path) => Self::with_file(path),
            None => Self {
                file: PathBuf::from(DEFAULT_CONFIG_FILE),
                required: false,
            },
        }
    }

    /// Load from `path`, which must exist.
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: path.into(),
            required: true,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Merge the file and the environment, then validate the result.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        if self.required && !self.file.exists() {
            return Err(ConfigError::NotFound(self.file.clone()));
        }

        let settings: Settings = Config::builder()
            .add_source(
                File::from(self.file.as_path())
                    .format(FileFormat::Toml)
                    .required(self.required),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(ENV_SEPARATOR)
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        tracing::debug!(file = %self.file.display(), backend = ?settings.cache.backend, "Settings loaded");
        Ok(settings)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ValidationPolicy;
    use crate::config::settings::CacheBackend;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Environment variables are process-wide.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Run `f` with `vars` applied, restoring the previous values afterwards.
    fn with_env<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
        let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let saved: Vec<_> = vars
            .iter()
            .map(|(name, _)| (name.to_string(), std::env::var_os(name)))
            .collect();
        for (name, value) in vars {
            // SAFETY: serialized by ENV_LOCK, and no other test reads these variables.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }

        let result = f();

        for (name, value) in saved {
            // SAFETY: as above.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(&name, value),
                    None => std::env::remove_var(&name),
                }
            }
        }
        result
    }

    fn settings_file(content: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stash.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_loads_file() {
        let (_dir, path) = settings_file(
            r#"
[cache]
backend = "disk"
prefix = "app"
validation_policy = "all"

[cache.disk]
directory = "/tmp/stash"

[logger]
format = "json"
"#,
        );

        let settings = with_env(&[("STASH_CACHE__BACKEND", None)], || {
            ConfigLoader::with_file(&path).load().unwrap()
        });

        assert_eq!(settings.cache.backend, CacheBackend::Disk);
        assert_eq!(settings.cache.prefix.as_deref(), Some("app"));
        assert_eq!(settings.cache.validation_policy, ValidationPolicy::All);
        assert_eq!(settings.cache.disk.directory, "/tmp/stash");
        assert_eq!(settings.cache.disk.name, "stash");
        assert_eq!(settings.logger.format, "json");
    }

    #[test]
    fn test_environment_overrides_file() {
        let (_dir, path) = settings_file(
            r#"
[cache]
backend = "memory"

[cache.memcached]
host = "10.0.0.5"
"#,
        );

        let settings = with_env(
            &[
                ("STASH_CACHE__BACKEND", Some("memcached")),
                ("STASH_CACHE__MEMCACHED__PORT", Some("22122")),
                ("STASH_CACHE__MEMCACHED__KEY_PREFIX", Some("svc")),
            ],
            || ConfigLoader::with_file(&path).load().unwrap(),
        );

        assert_eq!(settings.cache.backend, CacheBackend::Memcached);
        assert_eq!(settings.cache.memcached.host, "10.0.0.5");
        assert_eq!(settings.cache.memcached.port, 22122);
        assert_eq!(settings.cache.memcached.key_prefix, "svc");
    }

    #[test]
    fn test_config_file_variable_selects_file() {
        let (_dir, path) = settings_file("[logger]\nlevel = \"debug\"\n");

        let loader = with_env(&[(CONFIG_FILE_ENV, path.to_str())], ConfigLoader::new);
        assert_eq!(loader.file(), path.as_path());
        assert_eq!(loader.load().unwrap().logger.level, "debug");
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.toml");

        let err = ConfigLoader::with_file(&missing).load().unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(path) if path == missing));
    }

    #[test]
    fn test_default_file_is_optional() {
        let loader = ConfigLoader {
            file: PathBuf::from("does/not/exist.toml"),
            required: false,
        };

        let settings = with_env(&[("STASH_CACHE__BACKEND", None)], || loader.load().unwrap());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_bundled_default_file_loads() {
        let settings = with_env(
            &[(CONFIG_FILE_ENV, None), ("STASH_CACHE__BACKEND", None)],
            || ConfigLoader::new().load().unwrap(),
        );
        assert_eq!(settings.cache.backend, CacheBackend::Memory);
        assert_eq!(settings.cache.redis.pool_size, 4);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let (_dir, path) = settings_file("[cache.redis]\nurl = \"http://localhost:6379\"\n");

        let err = with_env(&[], || ConfigLoader::with_file(&path).load().unwrap_err());
        assert_eq!(err.field(), Some("cache.redis.url"));
    }

    #[test]
    fn test_malformed_file_is_a_load_error() {
        let (_dir, path) = settings_file("[cache]\nbackend = \"sqlite\"\n");

        let err = with_env(&[("STASH_CACHE__BACKEND", None)], || {
            ConfigLoader::with_file(&path).load().unwrap_err()
        });
        assert!(matches!(err, ConfigError::Load(_)));
    }
}
