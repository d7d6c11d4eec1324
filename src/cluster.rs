//! In-memory cluster snapshot used as the pod lookup.
//!
//! Holds the pods discovered in one pass, indexed by UID. Snapshots can be
//! loaded from YAML or JSON, either a bare list of pods or a Kubernetes
//! `List` object with an `items` field.

use crate::action::{ActionItem, PodLookup};
use crate::error::{ActionLockError, Result};
use k8s_openapi::api::core::v1::Pod;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    List { items: Vec<Pod> },
    Pods(Vec<Pod>),
}

/// Pods known to the agent at one point in time.
#[derive(Debug, Clone, Default)]
pub struct ClusterSnapshot {
    pods: Vec<Pod>,
    by_uid: HashMap<String, usize>,
}

impl ClusterSnapshot {
    pub fn new(pods: Vec<Pod>) -> Self {
        let by_uid = pods
            .iter()
            .enumerate()
            .filter_map(|(index, pod)| pod.metadata.uid.clone().map(|uid| (uid, index)))
            .collect();
        Self { pods, by_uid }
    }

    /// Load a snapshot from a YAML or JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ActionLockError::UserError(format!(
                "failed to read cluster snapshot '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse a snapshot from YAML (JSON is accepted as a subset).
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: SnapshotFile = serde_yaml::from_str(content).map_err(|e| {
            ActionLockError::UserError(format!("failed to parse cluster snapshot: {}", e))
        })?;

        let pods = match file {
            SnapshotFile::List { items } => items,
            SnapshotFile::Pods(pods) => pods,
        };
        Ok(Self::new(pods))
    }

    pub fn pods(&self) -> &[Pod] {
        &self.pods
    }

    pub fn len(&self) -> usize {
        self.pods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pods.is_empty()
    }

    pub fn pod_by_uid(&self, uid: &str) -> Option<&Pod> {
        self.by_uid.get(uid).map(|&index| &self.pods[index])
    }

    pub fn pod_by_name(&self, namespace: &str, name: &str) -> Option<&Pod> {
        self.pods.iter().find(|pod| {
            pod.metadata.namespace.as_deref() == Some(namespace)
                && pod.metadata.name.as_deref() == Some(name)
        })
    }
}

impl PodLookup for ClusterSnapshot {
    fn pod_for(&self, item: &ActionItem) -> Option<Pod> {
        item.pod_id()
            .and_then(|uid| self.pod_by_uid(uid))
            .cloned()
    }
}
