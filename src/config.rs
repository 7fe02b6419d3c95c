//! Repository-level configuration.
//!
//! Mirrors the teacher's `NatsConfig`: a plain struct with a `Default` impl
//! and chainable builder methods, so the hardcoded tiering defaults become
//! overridable without touching call sites.

use crate::operation::Operation;

/// Per-method default [`Operation`] for a
/// [`crate::repository::tiered::NetworkStorageRepository`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub(crate) default_get: Operation,
    pub(crate) default_put: Operation,
    pub(crate) default_delete: Operation,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            default_get: Operation::StorageSync,
            default_put: Operation::NetworkSync,
            default_delete: Operation::NetworkSync,
        }
    }
}

impl RepositoryConfig {
    /// Start from the defaults (reads `StorageSync`, writes/deletes
    /// `NetworkSync`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the default operation used when `get`/`get_all` are called
    /// with [`Operation::Default`].
    pub fn with_default_get(mut self, op: Operation) -> Self {
        self.default_get = op;
        self
    }

    /// Override the default operation used when `put`/`put_all` are called
    /// with [`Operation::Default`].
    pub fn with_default_put(mut self, op: Operation) -> Self {
        self.default_put = op;
        self
    }

    /// Override the default operation used when `delete`/`delete_all` are
    /// called with [`Operation::Default`].
    pub fn with_default_delete(mut self, op: Operation) -> Self {
        self.default_delete = op;
        self
    }

    pub(crate) fn resolve_get(&self, op: Operation) -> Operation {
        match op {
            Operation::Default => self.default_get,
            other => other,
        }
    }

    pub(crate) fn resolve_put(&self, op: Operation) -> Operation {
        match op {
            Operation::Default => self.default_put,
            other => other,
        }
    }

    pub(crate) fn resolve_delete(&self, op: Operation) -> Operation {
        match op {
            Operation::Default => self.default_delete,
            other => other,
        }
    }
}
