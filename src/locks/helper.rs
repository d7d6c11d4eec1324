//! Per-action lock handle with bounded blocking acquire.

use super::expiration_map::ExpirationMap;
use super::metadata::LockMetadata;
use crate::error::{ActionLockError, Result};
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Floor for the wait between two acquire attempts.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Handle returned to the action pipeline once its lock is held.
pub type LockHandle = LockHelper;

/// Background thread keeping a held entry alive.
#[derive(Debug)]
struct Renewer {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl Renewer {
    fn spawn(store: Arc<ExpirationMap>, key: String, token: u64) -> Self {
        let (stop, stopped) = mpsc::channel::<()>();
        let interval = (store.ttl() / 2).max(MIN_POLL_INTERVAL);

        let handle = thread::spawn(move || {
            loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        if !store.renew_token(&key, token) {
                            warn!(key = %key, "lock entry lost, stopping renewal");
                            return;
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        });

        Self { stop, handle }
    }

    fn stop(self) {
        // The thread may already have exited on its own.
        let _ = self.stop.send(());
        if self.handle.join().is_err() {
            warn!("lock renewal thread panicked");
        }
    }
}

/// Lock helper bound to one key and one [`ExpirationMap`].
///
/// Created per action attempt, locked once with [`LockHelper::try_lock`] and
/// released exactly once, either explicitly with [`LockHelper::release`] or
/// when dropped. A helper is never reused across actions.
///
/// Each acquisition is tagged with a token, so a helper whose entry expired
/// and was reclaimed by another acquirer neither renews nor releases the
/// successor's entry.
#[derive(Debug)]
pub struct LockHelper {
    key: String,
    store: Arc<ExpirationMap>,
    holder: String,
    token: Option<u64>,
    attempts: u32,
    renewer: Option<Renewer>,
}

impl LockHelper {
    /// Create a helper for `key` that does not hold the lock yet.
    ///
    /// Fails with [`ActionLockError::InvalidKey`] if the key is empty.
    pub fn new(key: impl Into<String>, store: Arc<ExpirationMap>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ActionLockError::InvalidKey(
                "lock key must not be empty".to_string(),
            ));
        }

        Ok(Self {
            key,
            store,
            holder: "unknown".to_string(),
            token: None,
            attempts: 0,
            renewer: None,
        })
    }

    /// Label the helper with the action that will hold the lock.
    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = holder.into();
        self
    }

    /// The lock key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether this helper currently holds its lock.
    ///
    /// Turns `false` once the entry expired, even before `release`.
    pub fn is_locked(&self) -> bool {
        self.token
            .is_some_and(|token| self.store.is_held_by(&self.key, token))
    }

    /// Number of acquire attempts made by the last `try_lock` call.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Acquire the lock, waiting up to `timeout`.
    ///
    /// Between attempts the caller blocks for at most `poll_interval`, and is
    /// woken early when the key is released or its entry expires. There is no
    /// queue: whichever waiter retries first after a release wins.
    pub fn try_lock(&mut self, timeout: Duration, poll_interval: Duration) -> Result<()> {
        if self.is_locked() {
            return Ok(());
        }
        if self.token.is_some() {
            // The previous entry expired; forget it before acquiring again.
            self.release();
        }

        let poll_interval = poll_interval.max(MIN_POLL_INTERVAL);
        let start = Instant::now();
        self.attempts = 0;

        loop {
            self.attempts += 1;
            if let Some(token) = self
                .store
                .acquire_token(&self.key, LockMetadata::new(&self.holder))
            {
                self.token = Some(token);
                debug!(
                    key = %self.key,
                    holder = %self.holder,
                    attempts = self.attempts,
                    "lock acquired"
                );
                return Ok(());
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(ActionLockError::LockTimeout {
                    key: self.key.clone(),
                    waited: timeout,
                });
            }

            self.store
                .wait_for_release(&self.key, poll_interval.min(timeout - elapsed));
        }
    }

    /// Keep the held entry alive until release by renewing it every half TTL.
    ///
    /// Does nothing if the lock is not held or renewal is already running.
    pub fn keep_renew(&mut self) {
        let Some(token) = self.token else {
            return;
        };
        if self.renewer.is_some() {
            return;
        }
        self.renewer = Some(Renewer::spawn(
            Arc::clone(&self.store),
            self.key.clone(),
            token,
        ));
    }

    /// Release the lock if held. Safe to call more than once.
    ///
    /// Only the entry this helper created is removed; if it expired and the
    /// key was taken by someone else, the new holder keeps it.
    pub fn release(&mut self) {
        if let Some(renewer) = self.renewer.take() {
            renewer.stop();
        }

        if let Some(token) = self.token.take() {
            if !self.store.release_token(&self.key, token) {
                warn!(key = %self.key, "lock entry expired before release");
            }
        }
    }
}

impl Drop for LockHelper {
    fn drop(&mut self) {
        self.release();
    }
}
