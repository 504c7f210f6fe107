//! Retry tuning, optionally loaded from `$XDG_CONFIG_HOME/cogito/config.toml`.
//!
//! Per-invocation configuration comes from the JSON request; this file only
//! adjusts how long a publish may keep retrying.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (`[retry]` section). Keys left out keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay in seconds before the first retry (e.g. 0.5 = 500ms).
    pub first_delay_secs: f64,
    /// Maximum single backoff delay in seconds.
    pub backoff_limit_secs: u64,
    /// Maximum cumulative sleep of one publish, in seconds.
    pub upper_bound_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let p = RetryPolicy::default();
        Self {
            first_delay_secs: p.first_delay.as_secs_f64(),
            backoff_limit_secs: p.backoff_limit.as_secs(),
            upper_bound_secs: p.upper_bound.as_secs(),
        }
    }
}

impl RetryConfig {
    /// Converts to a validated policy.
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        let first_delay = Duration::try_from_secs_f64(self.first_delay_secs)
            .with_context(|| format!("retry.first_delay_secs = {}", self.first_delay_secs))?;
        let policy = RetryPolicy {
            first_delay,
            backoff_limit: Duration::from_secs(self.backoff_limit_secs),
            upper_bound: Duration::from_secs(self.upper_bound_secs),
        };
        policy.validate()?;
        Ok(policy)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CogitoConfig {
    #[serde(default)]
    pub retry: RetryConfig,
}

impl CogitoConfig {
    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        self.retry.to_policy()
    }
}

/// Path of the config file, if one exists.
pub fn config_path() -> Result<Option<PathBuf>> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("cogito")?;
    Ok(xdg_dirs.find_config_file("config.toml"))
}

/// Load configuration from disk; built-in defaults when there is no file.
///
/// The file is never created: resource containers may be read-only.
pub fn load() -> Result<CogitoConfig> {
    match config_path()? {
        Some(path) => load_from(&path),
        None => Ok(CogitoConfig::default()),
    }
}

pub fn load_from(path: &Path) -> Result<CogitoConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CogitoConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.retry_policy()
        .with_context(|| format!("invalid retry settings in {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(cfg)
}
