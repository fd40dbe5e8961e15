//! Schema synchronization settings.

use crate::error::{OrmError, OrmResult};

/// Environment variable read by [`SyncConfig::from_env`] for `keep_unmanaged_indexes`.
pub const ENV_KEEP_UNMANAGED_INDEXES: &str = "PGDECL_KEEP_UNMANAGED_INDEXES";
/// Environment variable read by [`SyncConfig::from_env`] for `defer_constraints`.
pub const ENV_DEFER_CONSTRAINTS: &str = "PGDECL_DEFER_CONSTRAINTS";

/// Configuration for [`SchemaSync`](crate::schema::SchemaSync).
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Leave alone a live index that carries no comment (default `false`).
    ///
    /// Declared indexes are always created with their definition as comment,
    /// so an index without one was created or tuned by hand. When set, such an
    /// index is kept even if it differs from the declaration.
    pub keep_unmanaged_indexes: bool,
    /// Queue constraint additions until `finalize_constraints` instead of
    /// applying them while the other objects are still being compared.
    pub defer_constraints: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            keep_unmanaged_indexes: false,
            defer_constraints: true,
        }
    }
}

impl SyncConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether uncommented live indexes are kept.
    pub fn keep_unmanaged_indexes(mut self, keep: bool) -> Self {
        self.keep_unmanaged_indexes = keep;
        self
    }

    /// Set whether constraint additions are deferred.
    pub fn defer_constraints(mut self, defer: bool) -> Self {
        self.defer_constraints = defer;
        self
    }

    /// Build a configuration from the process environment.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> OrmResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> OrmResult<Self> {
        let mut config = Self::default();
        if let Some(v) = lookup(ENV_KEEP_UNMANAGED_INDEXES) {
            config.keep_unmanaged_indexes = parse_flag(ENV_KEEP_UNMANAGED_INDEXES, &v)?;
        }
        if let Some(v) = lookup(ENV_DEFER_CONSTRAINTS) {
            config.defer_constraints = parse_flag(ENV_DEFER_CONSTRAINTS, &v)?;
        }
        Ok(config)
    }
}

fn parse_flag(key: &str, value: &str) -> OrmResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(OrmError::validation(format!(
            "{key}: expected a boolean, got '{other}'"
        ))),
    }
}
