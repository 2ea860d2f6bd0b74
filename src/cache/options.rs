//! Per-call cache options and their normalized form.

use std::path::PathBuf;

use crate::cache::expiration::Expiration;
use crate::cache::validator::Validator;

/// Options accepted by [`Cache::add`](crate::cache::Cache::add) and
/// [`Cache::clean`](crate::cache::Cache::clean).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheOptions {
    /// Lifetime of the entry. `None` keeps it until removed.
    pub expiration: Option<Expiration>,
    /// Renew the expiration window on every successful read.
    pub shift: bool,
    /// Files whose modification time invalidates the entry when it changes.
    pub files: Vec<PathBuf>,
    /// Additional validators, evaluated before the file validators.
    pub validators: Vec<Validator>,
    /// Required by `clean` to flush the whole backend.
    pub all: bool,
}

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that make `clean` flush everything.
    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    pub fn expire(mut self, expiration: impl Into<Expiration>) -> Self {
        self.expiration = Some(expiration.into());
        self
    }

    pub fn sliding(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn watch_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    pub fn watch_files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }
}

/// Normalized expiration and validation data handed to drivers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Descriptor {
    /// Seconds from the moment of writing.
    pub expiration: Option<i64>,
    pub shift: bool,
    pub validators: Vec<Validator>,
}

impl Descriptor {
    /// The entry must be deleted instead of written.
    pub fn is_expired(&self) -> bool {
        self.expiration.is_some_and(|seconds| seconds <= 0)
    }

    /// Positive TTL for the backend's own expiration mechanism.
    pub fn native_ttl(&self) -> Option<u64> {
        self.expiration
            .filter(|seconds| *seconds > 0)
            .map(|seconds| seconds as u64)
    }

    /// TTL kept inside the stored envelope for sliding expiration.
    pub fn sliding_ttl(&self) -> Option<u64> {
        if self.shift { self.native_ttl() } else { None }
    }
}

/// Turn caller options into a [`Descriptor`].
///
/// Expressions that cannot be parsed resolve to `0`, so the entry expires
/// immediately.
pub fn normalize(options: CacheOptions) -> Descriptor {
    let CacheOptions {
        expiration,
        shift,
        files,
        mut validators,
        all: _,
    } = options;

    let expiration = expiration.map(|expiration| {
        expiration.resolve().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Unparseable expiration, entry expires immediately");
            0
        })
    });

    validators.extend(files.into_iter().map(Validator::watch_file));

    Descriptor {
        expiration,
        shift,
        validators,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_normalize_expiration() {
        let descriptor = normalize(CacheOptions::new().expire("10 seconds"));
        assert_eq!(descriptor.expiration, Some(10));
        assert!(!descriptor.shift);
        assert!(descriptor.validators.is_empty());
    }

    #[test]
    fn test_normalize_without_options() {
        assert_eq!(normalize(CacheOptions::new()), Descriptor::default());
    }

    #[test]
    fn test_normalize_file() {
        let descriptor = normalize(CacheOptions::new().watch_file("./testFile.yml"));
        assert_eq!(descriptor.expiration, None);
        assert_eq!(
            descriptor.validators,
            vec![Validator::FileUnchanged {
                path: PathBuf::from("./testFile.yml"),
                modified: None,
            }]
        );
    }

    #[test]
    fn test_normalize_expiration_and_files() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("a.yml");
        let second = dir.path().join("b.yml");
        fs::write(&first, "a").unwrap();

        let descriptor = normalize(
            CacheOptions::new()
                .expire("10 seconds")
                .watch_files([&first, &second]),
        );

        assert_eq!(descriptor.expiration, Some(10));
        assert_eq!(descriptor.validators.len(), 2);
        match &descriptor.validators[0] {
            Validator::FileUnchanged { path, modified } => {
                assert_eq!(path, &first);
                assert!(modified.is_some());
            }
            other => panic!("unexpected validator: {:?}", other),
        }
    }

    #[test]
    fn test_caller_validators_come_first() {
        let descriptor = normalize(
            CacheOptions::new()
                .watch_file("./testFile.yml")
                .validator(Validator::external("flag", Value::Null)),
        );
        assert!(matches!(descriptor.validators[0], Validator::External { .. }));
        assert!(matches!(descriptor.validators[1], Validator::FileUnchanged { .. }));
    }

    #[test]
    fn test_unparseable_expiration_expires_immediately() {
        let descriptor = normalize(CacheOptions::new().expire("not a time"));
        assert_eq!(descriptor.expiration, Some(0));
        assert!(descriptor.is_expired());
    }

    #[test]
    fn test_descriptor_ttls() {
        let fixed = normalize(CacheOptions::new().expire(30_i64));
        assert_eq!(fixed.native_ttl(), Some(30));
        assert_eq!(fixed.sliding_ttl(), None);

        let sliding = normalize(CacheOptions::new().expire(30_i64).sliding());
        assert_eq!(sliding.native_ttl(), Some(30));
        assert_eq!(sliding.sliding_ttl(), Some(30));

        let expired = normalize(CacheOptions::new().expire(-1_i64).sliding());
        assert!(expired.is_expired());
        assert_eq!(expired.native_ttl(), None);
        assert_eq!(expired.sliding_ttl(), None);
    }
}
