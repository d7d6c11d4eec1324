//! Error types for the action lock subsystem.
//!
//! Uses thiserror for derive macros. Every variant carries enough context
//! (lock key, time waited, pod identity) for the action pipeline to log the
//! failure and decide whether to resubmit the whole action later.

use crate::exit_codes;
use std::time::Duration;
use thiserror::Error;

/// Main error type for action lock operations.
#[derive(Error, Debug)]
pub enum ActionLockError {
    /// Lock-key derivation produced an empty or unusable key.
    #[error("invalid lock key: {0}")]
    InvalidKey(String),

    /// The owning controller of a pod could not be resolved.
    #[error("failed to resolve lock key for pod {pod}: {reason}")]
    KeyResolution { pod: String, reason: String },

    /// The lock stayed contended for the whole wait budget.
    #[error("timed out after {waited:?} waiting for lock '{key}'")]
    LockTimeout { key: String, waited: Duration },

    /// The action handler ran under the lock and failed.
    #[error("action {action} failed: {reason}")]
    ActionFailed { action: String, reason: String },

    /// Bad arguments, unreadable input files or invalid configuration.
    #[error("{0}")]
    UserError(String),
}

impl ActionLockError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ActionLockError::UserError(_) => exit_codes::USER_ERROR,
            ActionLockError::InvalidKey(_) => exit_codes::USER_ERROR,
            ActionLockError::ActionFailed { .. } => exit_codes::ACTION_FAILURE,
            ActionLockError::KeyResolution { .. } => exit_codes::KEY_RESOLUTION_FAILURE,
            ActionLockError::LockTimeout { .. } => exit_codes::LOCK_FAILURE,
        }
    }

    /// Whether resubmitting the same action later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ActionLockError::LockTimeout { .. })
    }
}

/// Result type alias for action lock operations.
pub type Result<T> = std::result::Result<T, ActionLockError>;
