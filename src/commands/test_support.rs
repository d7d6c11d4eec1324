//! Fixture files for command tests.

use crate::cli::InputArgs;
use std::path::Path;
use tempfile::TempDir;

pub(crate) const SNAPSHOT: &str = r#"
- metadata:
    name: web-a
    namespace: ns1
    uid: uid-a
    ownerReferences:
      - { apiVersion: apps/v1, kind: ReplicaSet, name: web, uid: rs-1, controller: true }
- metadata:
    name: web-b
    namespace: ns1
    uid: uid-b
    ownerReferences:
      - { apiVersion: apps/v1, kind: ReplicaSet, name: web, uid: rs-1, controller: true }
- metadata:
    name: standalone
    namespace: ns1
    uid: pod-uid-123
- metadata:
    name: legacy
    namespace: ns1
    uid: uid-legacy
    annotations:
      kubernetes.io/created-by: "{broken"
"#;

pub(crate) const ACTIONS: &str = r#"
- uuid: a-1
  actionType: MOVE
  targetSE: { id: uid-a, entityType: CONTAINER_POD }
- uuid: a-2
  actionType: MOVE
  targetSE: { id: uid-b, entityType: CONTAINER_POD }
- uuid: a-3
  actionType: RESIZE
  targetSE: { id: c-9, entityType: CONTAINER }
  hostedBySE: { id: pod-uid-123, entityType: CONTAINER_POD }
- uuid: a-4
  actionType: PROVISION
  targetSE: { id: vm-77, entityType: VIRTUAL_MACHINE }
"#;

/// Write the snapshot and the given action list into a temp dir.
pub(crate) fn write_input(actions: &str) -> (TempDir, InputArgs) {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "pods.yaml", SNAPSHOT);
    write(dir.path(), "actions.yaml", actions);

    let input = InputArgs {
        snapshot: Some(dir.path().join("pods.yaml")),
        actions: dir.path().join("actions.yaml"),
    };
    (dir, input)
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}
