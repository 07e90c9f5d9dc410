use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Enumerated;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Planned,
    InProgress,
    Completed,
}

impl Enumerated for ProjectStatus {
    const VALUES: &'static [&'static str] = &["planned", "in-progress", "completed"];

    fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planned => "planned",
            ProjectStatus::InProgress => "in-progress",
            ProjectStatus::Completed => "completed",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "planned" => Some(ProjectStatus::Planned),
            "in-progress" => Some(ProjectStatus::InProgress),
            "completed" => Some(ProjectStatus::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub location: Location,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub client: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}
