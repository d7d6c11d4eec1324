//! The shared table of expiring lock entries.

use super::metadata::LockMetadata;
use super::types::LockInfo;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Floor for the per-entry TTL. A zero TTL would expire entries on insert.
pub(crate) const MIN_TTL: Duration = Duration::from_millis(1);

/// One held lock.
#[derive(Debug)]
struct Entry {
    metadata: LockMetadata,
    expire_at: Instant,
    /// Identifies the acquisition that created this entry.
    token: u64,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expire_at
    }
}

/// Registry of named mutual-exclusion entries, each living for at most one TTL
/// unless renewed.
///
/// The presence of a live entry for a key *is* the lock. All operations take
/// the internal mutex and never block beyond it; callers that want to wait for
/// a key go through [`super::LockHelper::try_lock`].
///
/// Construct one per process and share it behind an `Arc`.
#[derive(Debug)]
pub struct ExpirationMap {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
    changed: Condvar,
    next_token: AtomicU64,
}

impl ExpirationMap {
    /// Create an empty map whose entries expire `ttl` after acquisition or
    /// their last renewal.
    ///
    /// A TTL below one millisecond is raised to one millisecond.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: ttl.max(MIN_TTL),
            entries: Mutex::new(HashMap::new()),
            changed: Condvar::new(),
            next_token: AtomicU64::new(1),
        }
    }

    /// The per-entry time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // The table is consistent after every operation, so a panic in another
    // holder of the mutex never leaves it half-updated.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert an entry for `key` if no live entry exists.
    ///
    /// An expired entry is reclaimed and replaced. Returns `false` without
    /// blocking when the key is held by a live entry.
    pub fn acquire(&self, key: &str, metadata: LockMetadata) -> bool {
        self.acquire_token(key, metadata).is_some()
    }

    /// Like [`ExpirationMap::acquire`], returning a token identifying the new
    /// entry for [`ExpirationMap::release_token`] and
    /// [`ExpirationMap::renew_token`].
    pub(crate) fn acquire_token(&self, key: &str, metadata: LockMetadata) -> Option<u64> {
        let now = Instant::now();
        let mut entries = self.entries();

        if let Some(existing) = entries.get(key) {
            if !existing.is_expired(now) {
                return None;
            }
            warn!(
                key,
                holder = %existing.metadata.holder,
                "reclaiming expired lock entry"
            );
        }

        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        entries.insert(
            key.to_string(),
            Entry {
                metadata,
                expire_at: now + self.ttl,
                token,
            },
        );
        debug!(key, "lock entry acquired");
        Some(token)
    }

    /// Remove the entry for `key`, whoever holds it.
    ///
    /// Releasing an absent key is a no-op; the return value only reports
    /// whether an entry was removed.
    pub fn release(&self, key: &str) -> bool {
        let removed = self.entries().remove(key).is_some();
        if removed {
            debug!(key, "lock entry released");
            self.changed.notify_all();
        }
        removed
    }

    /// Remove the entry for `key` only if it is the one created with `token`.
    ///
    /// An entry that expired and was reclaimed by another acquirer is left
    /// alone.
    pub(crate) fn release_token(&self, key: &str, token: u64) -> bool {
        let removed = {
            let mut entries = self.entries();
            match entries.get(key) {
                Some(entry) if entry.token == token => entries.remove(key).is_some(),
                _ => false,
            }
        };
        if removed {
            debug!(key, "lock entry released");
            self.changed.notify_all();
        }
        removed
    }

    /// Push the expiry of a live entry to one TTL from now.
    ///
    /// Returns `false` if the key is absent or its entry already expired.
    pub fn renew(&self, key: &str) -> bool {
        self.renew_matching(key, |_| true)
    }

    /// Renew the entry for `key` only if it is the one created with `token`.
    pub(crate) fn renew_token(&self, key: &str, token: u64) -> bool {
        self.renew_matching(key, |entry| entry.token == token)
    }

    fn renew_matching(&self, key: &str, matches: impl Fn(&Entry) -> bool) -> bool {
        let now = Instant::now();
        let mut entries = self.entries();
        match entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) && matches(entry) => {
                entry.expire_at = now + self.ttl;
                entry.metadata.touch();
                true
            }
            _ => false,
        }
    }

    /// Whether a live entry exists for `key`.
    pub fn is_held(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries()
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Whether the live entry for `key` is the one created with `token`.
    pub(crate) fn is_held_by(&self, key: &str, token: u64) -> bool {
        let now = Instant::now();
        self.entries()
            .get(key)
            .is_some_and(|entry| entry.token == token && !entry.is_expired(now))
    }

    /// Number of entries in the table, expired ones included.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the table has no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Drop every expired entry and return the reclaimed keys, sorted.
    pub fn purge_expired(&self) -> Vec<String> {
        let now = Instant::now();
        let mut purged = Vec::new();
        {
            let mut entries = self.entries();
            entries.retain(|key, entry| {
                if entry.is_expired(now) {
                    purged.push(key.clone());
                    false
                } else {
                    true
                }
            });
        }

        if !purged.is_empty() {
            purged.sort();
            warn!(count = purged.len(), "purged expired lock entries");
            self.changed.notify_all();
        }
        purged
    }

    /// Snapshot of the live entries, sorted by key.
    pub fn list(&self) -> Vec<LockInfo> {
        let now = Instant::now();
        let mut locks: Vec<LockInfo> = self
            .entries()
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, entry)| LockInfo {
                key: key.clone(),
                metadata: entry.metadata.clone(),
                remaining: entry.expire_at.saturating_duration_since(now),
            })
            .collect();

        locks.sort_by(|a, b| a.key.cmp(&b.key));
        locks
    }

    /// Block until the entry for `key` is released, purged or expired, or
    /// `max_wait` elapses.
    ///
    /// Returns immediately when `key` has no live entry. Wakeups may be
    /// spurious; callers re-check with [`ExpirationMap::acquire`].
    pub(crate) fn wait_for_release(&self, key: &str, max_wait: Duration) {
        let now = Instant::now();
        let entries = self.entries();
        let wait = match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                max_wait.min(entry.expire_at.saturating_duration_since(now))
            }
            _ => return,
        };

        let _unused = self
            .changed
            .wait_timeout(entries, wait)
            .unwrap_or_else(PoisonError::into_inner);
    }
}
