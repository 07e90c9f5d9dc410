use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Enumerated, ProjectStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Available,
    InUse,
    Maintenance,
}

impl Enumerated for VehicleStatus {
    const VALUES: &'static [&'static str] = &["available", "in_use", "maintenance"];

    fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::InUse => "in_use",
            VehicleStatus::Maintenance => "maintenance",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(VehicleStatus::Available),
            "in_use" => Some(VehicleStatus::InUse),
            "maintenance" => Some(VehicleStatus::Maintenance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub license_plate: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub status: VehicleStatus,
    pub assigned_to_project: Option<AssignedProject>,
}

/// Subset of the assigned project embedded in vehicle listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedProject {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub status: ProjectStatus,
}
