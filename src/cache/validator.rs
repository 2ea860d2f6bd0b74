//! Read-time validators.
//!
//! Validators are stored next to the payload and evaluated every time the
//! entry is read. A failed validator evicts the entry.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored validity condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Validator {
    /// Valid while the file's modification time equals `modified`.
    /// `None` means the file did not exist when the entry was written.
    FileUnchanged {
        path: PathBuf,
        modified: Option<Timestamp>,
    },
    /// Named check registered on the [`ValidatorRunner`], with its arguments.
    External {
        name: String,
        #[serde(default)]
        args: Value,
    },
}

impl Validator {
    /// Capture the current modification time of `path`.
    pub fn watch_file(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let modified = file_modified(&path);
        Validator::FileUnchanged { path, modified }
    }

    pub fn external(name: impl Into<String>, args: Value) -> Self {
        Validator::External {
            name: name.into(),
            args,
        }
    }
}

/// Modification time of `path`, or `None` when it cannot be read.
pub fn file_modified(path: &Path) -> Option<Timestamp> {
    let modified = std::fs::metadata(path).and_then(|meta| meta.modified()).ok()?;
    Timestamp::try_from(modified).ok()
}

/// True iff the current modification time equals `captured`.
pub fn is_file_unchanged(path: &Path, captured: Option<Timestamp>) -> bool {
    file_modified(path) == captured
}

/// How a list of validators is reduced to a single verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Only the first validator decides; the rest are never evaluated.
    #[default]
    FirstOnly,
    /// Every validator must pass.
    All,
}

pub type CheckFn = dyn Fn(&Value) -> bool + Send + Sync;

/// Evaluates stored validators.
#[derive(Clone, Default)]
pub struct ValidatorRunner {
    policy: ValidationPolicy,
    checks: HashMap<String, Arc<CheckFn>>,
}

impl ValidatorRunner {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self {
            policy,
            checks: HashMap::new(),
        }
    }

    /// Register a named check used by [`Validator::External`].
    pub fn with_check<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.checks.insert(name.into(), Arc::new(check));
        self
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Reduce `validators` to a single "still valid" verdict.
    ///
    /// An empty list is valid.
    pub fn all_valid(&self, validators: &[Validator]) -> bool {
        match self.policy {
            ValidationPolicy::FirstOnly => validators.first().is_none_or(|v| self.is_valid(v)),
            ValidationPolicy::All => validators.iter().all(|v| self.is_valid(v)),
        }
    }

    pub fn is_valid(&self, validator: &Validator) -> bool {
        match validator {
            Validator::FileUnchanged { path, modified } => is_file_unchanged(path, *modified),
            Validator::External { name, args } => match self.checks.get(name) {
                Some(check) => check(args),
                None => {
                    tracing::warn!(validator = %name, "Unknown validator, treating entry as stale");
                    false
                }
            },
        }
    }
}

impl fmt::Debug for ValidatorRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.checks.keys().collect();
        names.sort();
        f.debug_struct("ValidatorRunner")
            .field("policy", &self.policy)
            .field("checks", &names)
            .finish()
    }
}
