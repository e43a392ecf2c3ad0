//! Routing table builder configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Result, RoutingError};

/// Key for the number of alternative routing tables generated per build
pub const TABLE_COUNT_KEY: &str = "routing.table.count";
/// Key for the base random seed; absent means seed from OS entropy
pub const RANDOM_SEED_KEY: &str = "routing.random.seed";

/// Default number of routing tables per build
pub const DEFAULT_TABLE_COUNT: usize = 10;
/// Upper bound on routing tables per build
pub const MAX_TABLE_COUNT: usize = 1024;

/// Generic key/value configuration handed to routing table builders
///
/// Builders pick out the keys they understand and ignore the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuilderConfig(BTreeMap<String, String>);

impl BuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a key, returning the updated config
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.insert(key.into(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Parse an optional key
    ///
    /// # Errors
    ///
    /// Returns `RoutingError::InvalidConfig` if the key is present but does not parse.
    pub fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .map(|raw| {
                raw.trim()
                    .parse::<T>()
                    .map_err(|e| RoutingError::invalid_config(key, format!("'{raw}': {e}")))
            })
            .transpose()
    }
}

/// Settings the low-level consumer builder takes from a [`BuilderConfig`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingSettings {
    /// Number of alternative routing tables per build (default: 10, at most 1024)
    pub table_count: usize,
    /// Base seed; table `i` is seeded with `seed + i`
    pub random_seed: Option<u64>,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            table_count: DEFAULT_TABLE_COUNT,
            random_seed: None,
        }
    }
}

impl RoutingSettings {
    /// Read settings from a builder config, applying defaults for missing keys
    pub fn from_config(config: &BuilderConfig) -> Result<Self> {
        let table_count = config
            .parse::<usize>(TABLE_COUNT_KEY)?
            .unwrap_or(DEFAULT_TABLE_COUNT);
        if table_count == 0 {
            return Err(RoutingError::invalid_config(
                TABLE_COUNT_KEY,
                "must be at least 1",
            ));
        }
        if table_count > MAX_TABLE_COUNT {
            return Err(RoutingError::invalid_config(
                TABLE_COUNT_KEY,
                format!("must be at most {MAX_TABLE_COUNT}"),
            ));
        }

        Ok(Self {
            table_count,
            random_seed: config.parse::<u64>(RANDOM_SEED_KEY)?,
        })
    }
}
