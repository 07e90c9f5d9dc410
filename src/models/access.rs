use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Enumerated;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Project,
    Vehicle,
    Collection,
}

impl Enumerated for ResourceKind {
    const VALUES: &'static [&'static str] = &["project", "vehicle", "collection"];

    fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Vehicle => "vehicle",
            ResourceKind::Collection => "collection",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "project" => Some(ResourceKind::Project),
            "vehicle" => Some(ResourceKind::Vehicle),
            "collection" => Some(ResourceKind::Collection),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessAction {
    Create,
    Read,
    Update,
    Delete,
}

impl AccessAction {
    pub const ALL: [AccessAction; 4] = [
        AccessAction::Create,
        AccessAction::Read,
        AccessAction::Update,
        AccessAction::Delete,
    ];
}

impl Enumerated for AccessAction {
    const VALUES: &'static [&'static str] = &["create", "read", "update", "delete"];

    fn as_str(&self) -> &'static str {
        match self {
            AccessAction::Create => "create",
            AccessAction::Read => "read",
            AccessAction::Update => "update",
            AccessAction::Delete => "delete",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(AccessAction::Create),
            "read" => Some(AccessAction::Read),
            "update" => Some(AccessAction::Update),
            "delete" => Some(AccessAction::Delete),
            _ => None,
        }
    }
}

/// One recorded access of a principal to a resource. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessEvent {
    pub id: Uuid,
    /// Not enforced as a foreign key; the user may no longer exist.
    pub user_id: Uuid,
    pub resource: ResourceKind,
    /// `None` for collection-level accesses such as listing every project.
    pub resource_id: Option<String>,
    pub action: AccessAction,
    pub timestamp: DateTime<Utc>,
}
