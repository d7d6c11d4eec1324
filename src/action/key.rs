//! Lock-key derivation.
//!
//! The key is a pure function of the action item and the current pod and
//! owner state:
//! - a pod owned by a controller locks `<kind>-<namespace>/<name>` so sibling
//!   pods of one workload serialize against each other
//! - a bare pod locks its UID
//! - an action that affects no pod locks the target entity id

use super::lock_store::PodLookup;
use super::model::ActionItem;
use super::owner::{OwnerResolver, pod_identifier};
use crate::error::{ActionLockError, Result};
use k8s_openapi::api::core::v1::Pod;
use tracing::error;

/// Derive the lock key for an action item.
pub fn lock_key(
    item: &ActionItem,
    pods: &dyn PodLookup,
    owners: &dyn OwnerResolver,
) -> Result<String> {
    match pods.pod_for(item) {
        Some(pod) => pod_lock_key(&pod, owners),
        None => Ok(item.target_entity_id().to_string()),
    }
}

/// Derive the lock key for a pod: its controller identity, or its UID when
/// the pod is bare.
pub fn pod_lock_key(pod: &Pod, owners: &dyn OwnerResolver) -> Result<String> {
    let owner = owners.resolve_owner(pod).map_err(|e| {
        error!(pod = %pod_identifier(pod), "failed to get pod parent info: {}", e);
        match e {
            ActionLockError::KeyResolution { .. } => e,
            other => ActionLockError::KeyResolution {
                pod: pod_identifier(pod),
                reason: other.to_string(),
            },
        }
    })?;

    Ok(match owner {
        Some(controller) => format!(
            "{}-{}/{}",
            controller.kind,
            pod.metadata.namespace.as_deref().unwrap_or_default(),
            controller.name
        ),
        None => pod.metadata.uid.clone().unwrap_or_default(),
    })
}
