//! Runs action handlers under their action lock.

use super::lock_store::ActionLockStore;
use super::model::ActionItem;
use crate::error::Result;
use serde::Serialize;
use std::thread;
use tracing::{info, warn};

/// Performs the cluster mutation for one action.
pub trait ActionHandler: Send + Sync {
    fn execute(&self, item: &ActionItem) -> Result<()>;
}

impl<F> ActionHandler for F
where
    F: Fn(&ActionItem) -> Result<()> + Send + Sync,
{
    fn execute(&self, item: &ActionItem) -> Result<()> {
        self(item)
    }
}

/// Final state of an executed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionResponseState {
    Succeeded,
    Failed,
}

/// Outcome reported back to the scheduler for one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub uuid: String,
    pub state: ActionResponseState,
    pub progress: u32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_key: Option<String>,
}

impl ActionResult {
    fn succeeded(item: &ActionItem, lock_key: String) -> Self {
        Self {
            uuid: item.uuid.clone(),
            state: ActionResponseState::Succeeded,
            progress: 100,
            description: format!("{} action succeeded", item.action_type.as_str()),
            lock_key: Some(lock_key),
        }
    }

    fn failed(item: &ActionItem, lock_key: Option<String>, description: String) -> Self {
        Self {
            uuid: item.uuid.clone(),
            state: ActionResponseState::Failed,
            progress: 0,
            description,
            lock_key,
        }
    }

    pub fn is_success(&self) -> bool {
        self.state == ActionResponseState::Succeeded
    }
}

/// Gates every action through [`ActionLockStore::get_lock`] before running
/// its handler.
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    store: ActionLockStore,
    keep_renew: bool,
}

impl ActionExecutor {
    pub fn new(store: ActionLockStore) -> Self {
        Self {
            store,
            keep_renew: true,
        }
    }

    /// Whether held locks are renewed while the handler runs.
    pub fn with_keep_renew(mut self, keep_renew: bool) -> Self {
        self.keep_renew = keep_renew;
        self
    }

    pub fn store(&self) -> &ActionLockStore {
        &self.store
    }

    /// Execute one action while holding its lock.
    ///
    /// Lock and handler failures are reported in the result rather than
    /// returned; the lock is always released before this returns.
    pub fn execute(&self, item: &ActionItem, handler: &dyn ActionHandler) -> ActionResult {
        let mut lock = match self.store.get_lock(item) {
            Ok(lock) => lock,
            Err(e) => {
                warn!(action = %item.uuid, "action not executed: {}", e);
                return ActionResult::failed(item, None, e.to_string());
            }
        };
        if self.keep_renew {
            lock.keep_renew();
        }

        let key = lock.key().to_string();
        let outcome = handler.execute(item);
        lock.release();

        match outcome {
            Ok(()) => {
                info!(action = %item.uuid, key = %key, "action succeeded");
                ActionResult::succeeded(item, key)
            }
            Err(e) => {
                warn!(action = %item.uuid, key = %key, "action failed: {}", e);
                ActionResult::failed(item, Some(key), e.to_string())
            }
        }
    }

    /// Execute a batch concurrently, one thread per action.
    ///
    /// Results are returned in the order of `items`.
    pub fn execute_all(
        &self,
        items: &[ActionItem],
        handler: &dyn ActionHandler,
    ) -> Vec<ActionResult> {
        thread::scope(|scope| {
            let handles: Vec<_> = items
                .iter()
                .map(|item| (item, scope.spawn(move || self.execute(item, handler))))
                .collect();

            handles
                .into_iter()
                .map(|(item, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        ActionResult::failed(item, None, "action handler panicked".to_string())
                    })
                })
                .collect()
        })
    }
}
