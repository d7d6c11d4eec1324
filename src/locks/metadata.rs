//! Lock metadata recorded with every lock entry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Who holds a lock entry and since when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMetadata {
    /// Owner of the lock (e.g., `user@HOST`).
    pub owner: String,

    /// The in-flight action holding the lock (usually the action uuid).
    pub holder: String,

    /// Timestamp when the lock was acquired.
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last renewal, if the lock was ever renewed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewed_at: Option<DateTime<Utc>>,
}

impl LockMetadata {
    /// Create new lock metadata with the current timestamp.
    pub fn new(holder: &str) -> Self {
        Self {
            owner: get_owner_string(),
            holder: holder.to_string(),
            created_at: Utc::now(),
            renewed_at: None,
        }
    }

    /// Record a renewal at the current time.
    pub fn touch(&mut self) {
        self.renewed_at = Some(Utc::now());
    }

    /// Calculate the age of the lock.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let seconds = age.num_seconds();
        let minutes = age.num_minutes();
        let hours = age.num_hours();

        if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds % 60)
        } else {
            format!("{}s", seconds)
        }
    }
}

/// Get the owner string for lock metadata.
pub(crate) fn get_owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}
