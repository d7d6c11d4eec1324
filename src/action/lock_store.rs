//! Acquisition of the lock guarding one action item.

use super::key;
use super::model::ActionItem;
use super::owner::{OwnerResolver, PodMetadataOwnerResolver};
use crate::error::Result;
use crate::locks::{ExpirationMap, LockHelper};
use k8s_openapi::api::core::v1::Pod;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Default total time to wait for a contended lock.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default time between two acquire attempts.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Finds the pod an action item affects.
///
/// Called on every lock attempt, so implementations must be cheap and free
/// of side effects. `None` means the action targets a non-pod entity.
pub trait PodLookup: Send + Sync {
    fn pod_for(&self, item: &ActionItem) -> Option<Pod>;
}

impl<F> PodLookup for F
where
    F: Fn(&ActionItem) -> Option<Pod> + Send + Sync,
{
    fn pod_for(&self, item: &ActionItem) -> Option<Pod> {
        self(item)
    }
}

/// Wait budget for a contended lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockTimings {
    pub wait_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for LockTimings {
    fn default() -> Self {
        Self {
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Hands out the lock serializing an action with every other action on the
/// same pod, workload controller or target entity.
#[derive(Clone)]
pub struct ActionLockStore {
    lock_map: Arc<ExpirationMap>,
    pods: Arc<dyn PodLookup>,
    owners: Arc<dyn OwnerResolver>,
    timings: LockTimings,
}

impl std::fmt::Debug for ActionLockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionLockStore")
            .field("lock_map", &self.lock_map)
            .field("timings", &self.timings)
            .finish_non_exhaustive()
    }
}

impl ActionLockStore {
    /// Create a store resolving pod owners from pod metadata.
    pub fn new(lock_map: Arc<ExpirationMap>, pods: Arc<dyn PodLookup>) -> Self {
        Self {
            lock_map,
            pods,
            owners: Arc::new(PodMetadataOwnerResolver),
            timings: LockTimings::default(),
        }
    }

    pub fn with_owner_resolver(mut self, owners: Arc<dyn OwnerResolver>) -> Self {
        self.owners = owners;
        self
    }

    pub fn with_timings(mut self, timings: LockTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn timings(&self) -> LockTimings {
        self.timings
    }

    /// The shared lock table.
    pub fn lock_map(&self) -> &Arc<ExpirationMap> {
        &self.lock_map
    }

    /// Derive the lock key for `item` without taking any lock.
    pub fn lock_key(&self, item: &ActionItem) -> Result<String> {
        key::lock_key(item, self.pods.as_ref(), self.owners.as_ref())
    }

    /// Acquire the lock for `item`, waiting up to the configured timeout.
    ///
    /// The returned helper holds the lock; the caller releases it once the
    /// action completes or fails (dropping it also releases).
    pub fn get_lock(&self, item: &ActionItem) -> Result<LockHelper> {
        let key = self.lock_key(item)?;
        debug!(action = %item.uuid, key = %key, "getting lock");

        let mut helper = LockHelper::new(key, Arc::clone(&self.lock_map))
            .map_err(|e| {
                error!(action = %item.uuid, "failed to get a lock helper: {}", e);
                e
            })?
            .with_holder(item.uuid.clone());

        if let Err(e) = helper.try_lock(self.timings.wait_timeout, self.timings.poll_interval) {
            error!(action = %item.uuid, key = %helper.key(), "failed to acquire lock: {}", e);
            return Err(e);
        }

        Ok(helper)
    }
}
