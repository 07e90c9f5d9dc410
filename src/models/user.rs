use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Enumerated;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Analista,
    Visitante,
}

impl Enumerated for Role {
    const VALUES: &'static [&'static str] = &["admin", "analista", "visitante"];

    fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Analista => "analista",
            Role::Visitante => "visitante",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Role::Admin),
            "analista" => Some(Role::Analista),
            "visitante" => Some(Role::Visitante),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// The public projection of a user attached to access events and reports.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
}
