//! Action item data model.
//!
//! Mirrors the fields of the scheduler's action item DTO that lock-key
//! derivation and pod lookup read. Field names follow the wire casing so
//! items can be loaded from JSON or YAML dumps.

use serde::{Deserialize, Serialize};

/// Kind of remediation requested by the scheduler.
///
/// Lock keys never depend on the action type, so types this agent does not
/// know are kept as [`ActionType::Other`] instead of rejecting the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    Move,
    Resize,
    RightSize,
    Provision,
    Suspend,
    Scale,
    #[serde(other)]
    Other,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Move => "move",
            ActionType::Resize => "resize",
            ActionType::RightSize => "right_size",
            ActionType::Provision => "provision",
            ActionType::Suspend => "suspend",
            ActionType::Scale => "scale",
            ActionType::Other => "other",
        }
    }
}

/// Type of a supply-chain entity referenced by an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    ContainerPod,
    Container,
    VirtualMachine,
    Application,
    Service,
    #[serde(other)]
    Other,
}

/// Reference to a supply-chain entity as reported by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDto {
    /// Entity identifier. For pods this is the pod UID.
    pub id: String,

    pub entity_type: EntityType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl EntityDto {
    pub fn new(id: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: id.into(),
            entity_type,
            display_name: None,
        }
    }
}

/// One unit of remediation work issued by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    /// Scheduler-assigned action id.
    pub uuid: String,

    pub action_type: ActionType,

    /// The entity the action is about.
    #[serde(rename = "targetSE")]
    pub target_se: EntityDto,

    /// Current provider, e.g. the node a pod moves away from.
    #[serde(rename = "currentSE", default, skip_serializing_if = "Option::is_none")]
    pub current_se: Option<EntityDto>,

    /// New provider, e.g. the node a pod moves to.
    #[serde(rename = "newSE", default, skip_serializing_if = "Option::is_none")]
    pub new_se: Option<EntityDto>,

    /// Entity hosting the target, e.g. the pod of a container being resized.
    #[serde(rename = "hostedBySE", default, skip_serializing_if = "Option::is_none")]
    pub hosted_by_se: Option<EntityDto>,
}

impl ActionItem {
    pub fn new(uuid: impl Into<String>, action_type: ActionType, target_se: EntityDto) -> Self {
        Self {
            uuid: uuid.into(),
            action_type,
            target_se,
            current_se: None,
            new_se: None,
            hosted_by_se: None,
        }
    }

    pub fn with_current_se(mut self, entity: EntityDto) -> Self {
        self.current_se = Some(entity);
        self
    }

    pub fn with_new_se(mut self, entity: EntityDto) -> Self {
        self.new_se = Some(entity);
        self
    }

    pub fn with_hosted_by_se(mut self, entity: EntityDto) -> Self {
        self.hosted_by_se = Some(entity);
        self
    }

    /// Identifier of the target entity, used as the lock key for actions
    /// that do not affect a pod.
    pub fn target_entity_id(&self) -> &str {
        &self.target_se.id
    }

    /// Id of the pod this action is about, if the item names one.
    ///
    /// A pod target names itself; a container target names its hosting pod.
    pub fn pod_id(&self) -> Option<&str> {
        match self.target_se.entity_type {
            EntityType::ContainerPod => Some(self.target_se.id.as_str()),
            EntityType::Container => [self.hosted_by_se.as_ref(), self.current_se.as_ref()]
                .into_iter()
                .flatten()
                .find(|entity| entity.entity_type == EntityType::ContainerPod)
                .map(|entity| entity.id.as_str()),
            _ => None,
        }
    }

    /// Parse a list of action items from YAML or JSON.
    pub fn list_from_yaml(content: &str) -> crate::error::Result<Vec<ActionItem>> {
        serde_yaml::from_str(content).map_err(|e| {
            crate::error::ActionLockError::UserError(format!(
                "failed to parse action items: {}",
                e
            ))
        })
    }
}
