//! Adapter configuration.
//!
//! ```
//! use instant_adapter::{AdapterConfig, MissPolicy};
//!
//! let config = AdapterConfig::from_toml_str(r#"
//! miss_policy = "retry"
//! thread_checks = false
//! "#).unwrap();
//! assert_eq!(config.miss_policy, MissPolicy::Retry);
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// What the recycle cache does with a view id that resolved to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Store the miss; the subtree is never searched again for that id.
    #[default]
    Remember,
    /// Store nothing; the subtree is searched again on every bind until found.
    Retry,
}

/// Settings shared by every row of one adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Recycle cache behaviour for unresolvable view ids.
    pub miss_policy: MissPolicy,
    /// Assert that rows are created and bound on the thread that built the adapter.
    pub thread_checks: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            miss_policy: MissPolicy::default(),
            thread_checks: cfg!(debug_assertions),
        }
    }
}

impl AdapterConfig {
    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read a configuration from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Set the miss policy.
    pub fn with_miss_policy(mut self, policy: MissPolicy) -> Self {
        self.miss_policy = policy;
        self
    }

    /// Enable or disable thread affinity checks.
    pub fn with_thread_checks(mut self, enabled: bool) -> Self {
        self.thread_checks = enabled;
        self
    }
}
