//! Resolution of a pod's owning workload controller.

use crate::error::{ActionLockError, Result};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use serde::Deserialize;
use tracing::warn;

/// Legacy annotation carrying the serialized reference of a pod's creator.
pub const CREATED_BY_ANNOTATION: &str = "kubernetes.io/created-by";

/// The workload controller owning a pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerRef {
    pub kind: String,
    pub name: String,
}

impl ControllerRef {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl From<&OwnerReference> for ControllerRef {
    fn from(owner: &OwnerReference) -> Self {
        Self::new(owner.kind.clone(), owner.name.clone())
    }
}

/// Resolves the controller owning a pod.
///
/// `Ok(None)` means the pod is bare. Errors are propagated to the caller as
/// key-resolution failures, never swallowed.
pub trait OwnerResolver: Send + Sync {
    fn resolve_owner(&self, pod: &Pod) -> Result<Option<ControllerRef>>;
}

impl<F> OwnerResolver for F
where
    F: Fn(&Pod) -> Result<Option<ControllerRef>> + Send + Sync,
{
    fn resolve_owner(&self, pod: &Pod) -> Result<Option<ControllerRef>> {
        self(pod)
    }
}

/// Reads the owning controller from the pod's own metadata.
///
/// Owner references marked as controller take precedence over plain owner
/// references. When the pod has no owner references at all, the legacy
/// `kubernetes.io/created-by` annotation is consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct PodMetadataOwnerResolver;

impl OwnerResolver for PodMetadataOwnerResolver {
    fn resolve_owner(&self, pod: &Pod) -> Result<Option<ControllerRef>> {
        let owners = pod
            .metadata
            .owner_references
            .as_deref()
            .unwrap_or_default();

        if owners.is_empty() {
            return created_by_reference(pod);
        }

        let controllers: Vec<&OwnerReference> = owners
            .iter()
            .filter(|owner| owner.controller == Some(true))
            .collect();
        let candidates: Vec<&OwnerReference> = if controllers.is_empty() {
            owners.iter().collect()
        } else {
            controllers
        };

        Ok(single_controller(pod, &candidates))
    }
}

/// Pick the controller when all candidates agree on it.
///
/// Candidates that disagree on kind or name resolve to no controller, so the
/// pod is locked by its UID like a bare pod.
fn single_controller(pod: &Pod, candidates: &[&OwnerReference]) -> Option<ControllerRef> {
    let first = ControllerRef::from(*candidates.first()?);
    if candidates
        .iter()
        .all(|owner| owner.kind == first.kind && owner.name == first.name)
    {
        return Some(first);
    }

    warn!(
        pod = %pod_identifier(pod),
        owners = candidates.len(),
        "pod has conflicting owner references, treating it as a bare pod"
    );
    None
}

#[derive(Debug, Deserialize)]
struct SerializedReference {
    reference: ObjectReference,
}

#[derive(Debug, Deserialize)]
struct ObjectReference {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    name: String,
}

fn created_by_reference(pod: &Pod) -> Result<Option<ControllerRef>> {
    let Some(created_by) = pod
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(CREATED_BY_ANNOTATION))
    else {
        return Ok(None);
    };

    let serialized: SerializedReference =
        serde_json::from_str(created_by).map_err(|e| ActionLockError::KeyResolution {
            pod: pod_identifier(pod),
            reason: format!("invalid {} annotation: {}", CREATED_BY_ANNOTATION, e),
        })?;

    let ObjectReference { kind, name } = serialized.reference;
    if kind.is_empty() || name.is_empty() {
        return Err(ActionLockError::KeyResolution {
            pod: pod_identifier(pod),
            reason: format!("{} annotation lacks kind or name", CREATED_BY_ANNOTATION),
        });
    }
    Ok(Some(ControllerRef { kind, name }))
}

/// `namespace/name` of a pod, for log and error messages.
pub fn pod_identifier(pod: &Pod) -> String {
    format!(
        "{}/{}",
        pod.metadata.namespace.as_deref().unwrap_or_default(),
        pod.metadata.name.as_deref().unwrap_or_default()
    )
}
