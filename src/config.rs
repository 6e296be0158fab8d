//! Runtime configuration for the order cache.

use crate::persistence::DEFAULT_NAMESPACE;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Key the snapshot is stored under.
    pub namespace: String,
    /// Mailbox size of the store task.
    pub channel_capacity: usize,
    /// Page size used by [`CacheConfig::first_page`].
    pub default_page_size: u32,
    /// When set, snapshots are written as JSON files in this directory.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            channel_capacity: 32,
            default_page_size: 10,
            snapshot_dir: None,
        }
    }
}

fn positive<T: std::str::FromStr + PartialOrd + Default>(
    var: &'static str,
    value: String,
) -> Result<T, ConfigError> {
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(ConfigError::InvalidNumber { var, value }),
    }
}

impl CacheConfig {
    /// Reads `ORDER_CACHE_*` variables, falling back to defaults for unset ones.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `ORDER_CACHE_NAMESPACE` | `namespace` |
    /// | `ORDER_CACHE_CHANNEL_CAPACITY` | `channel_capacity` |
    /// | `ORDER_CACHE_PAGE_SIZE` | `default_page_size` |
    /// | `ORDER_CACHE_SNAPSHOT_DIR` | `snapshot_dir` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`CacheConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(namespace) = lookup("ORDER_CACHE_NAMESPACE") {
            if namespace.trim().is_empty() {
                return Err(ConfigError::Empty("ORDER_CACHE_NAMESPACE"));
            }
            config.namespace = namespace.trim().to_string();
        }
        if let Some(value) = lookup("ORDER_CACHE_CHANNEL_CAPACITY") {
            config.channel_capacity = positive("ORDER_CACHE_CHANNEL_CAPACITY", value)?;
        }
        if let Some(value) = lookup("ORDER_CACHE_PAGE_SIZE") {
            config.default_page_size = positive("ORDER_CACHE_PAGE_SIZE", value)?;
        }
        if let Some(dir) = lookup("ORDER_CACHE_SNAPSHOT_DIR").filter(|d| !d.trim().is_empty()) {
            config.snapshot_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// First page of the configured size with no filter.
    pub fn first_page(&self) -> crate::model::OrderQuery {
        crate::model::OrderQuery::first_page(self.default_page_size)
    }
}
