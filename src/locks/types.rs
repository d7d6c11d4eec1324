//! Lock information structures.

use super::metadata::LockMetadata;
use std::time::Duration;

/// Information about a live lock entry.
#[derive(Debug, Clone)]
pub struct LockInfo {
    /// The lock key (serialization domain).
    pub key: String,

    /// The lock metadata.
    pub metadata: LockMetadata,

    /// Time left before the entry becomes reclaimable.
    pub remaining: Duration,
}

impl std::fmt::Display for LockInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (owner: {}, holder: {}, age: {}, expires in {}s)",
            self.key,
            self.metadata.owner,
            self.metadata.holder,
            self.metadata.age_string(),
            self.remaining.as_secs()
        )
    }
}
