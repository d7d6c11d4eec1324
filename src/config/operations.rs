//! Config loading, validation, and conversion to lock settings.

use super::model::Config;
use crate::action::LockTimings;
use crate::error::{ActionLockError, Result};
use std::path::Path;
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ActionLockError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            ActionLockError::UserError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            ActionLockError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - all durations must be positive
    /// - `poll_interval_secs` must not exceed `wait_timeout_secs`
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("lock_ttl_secs", self.lock_ttl_secs),
            ("wait_timeout_secs", self.wait_timeout_secs),
            ("poll_interval_secs", self.poll_interval_secs),
        ] {
            if value == 0 {
                return Err(ActionLockError::UserError(format!(
                    "config validation failed: {} must be greater than 0",
                    name
                )));
            }
        }

        if self.poll_interval_secs > self.wait_timeout_secs {
            return Err(ActionLockError::UserError(format!(
                "config validation failed: poll_interval_secs ({}) must not exceed wait_timeout_secs ({})",
                self.poll_interval_secs, self.wait_timeout_secs
            )));
        }

        Ok(())
    }

    /// TTL of the lock table entries.
    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.lock_ttl_secs)
    }

    /// Wait budget handed to the action lock store.
    pub fn lock_timings(&self) -> LockTimings {
        LockTimings {
            wait_timeout: Duration::from_secs(self.wait_timeout_secs),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}
