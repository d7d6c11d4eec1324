//! Config struct definition and default implementation.

use super::types::LogFormat;
use serde::{Deserialize, Serialize};

/// Configuration for the action lock agent.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock table settings
    // =========================================================================
    /// Seconds an unreleased lock entry lives before it can be reclaimed.
    #[serde(default = "default_lock_ttl_secs")]
    pub lock_ttl_secs: u64,

    /// Whether held locks are renewed while their action runs.
    #[serde(default = "default_true")]
    pub keep_renew: bool,

    // =========================================================================
    // Acquisition settings
    // =========================================================================
    /// Total seconds an action waits for a contended lock.
    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,

    /// Seconds between two acquire attempts.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    // =========================================================================
    // Logging settings
    // =========================================================================
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

// Default value functions for serde
fn default_lock_ttl_secs() -> u64 {
    120
}
fn default_wait_timeout_secs() -> u64 {
    300
}
fn default_poll_interval_secs() -> u64 {
    10
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_ttl_secs: default_lock_ttl_secs(),
            keep_renew: default_true(),
            wait_timeout_secs: default_wait_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            log_format: LogFormat::default(),
        }
    }
}
