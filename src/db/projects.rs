use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Enumerated, Location, Project, ProjectStatus};

const COLUMNS: &str = "id, name, address, lat, lng, status, start_date, client";

pub struct NewProject<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub lat: f64,
    pub lng: f64,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub client: &'a str,
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    address: String,
    lat: f64,
    lng: f64,
    status: String,
    start_date: DateTime<Utc>,
    client: String,
}

/// Decode a stored project status, failing the row on an unknown value.
pub(crate) fn decode_status(value: &str) -> Result<ProjectStatus, sqlx::Error> {
    ProjectStatus::parse(value)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown project status '{value}'").into()))
}

impl TryFrom<ProjectRow> for Project {
    type Error = sqlx::Error;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            id: row.id,
            name: row.name,
            location: Location {
                address: row.address,
                lat: row.lat,
                lng: row.lng,
            },
            status: decode_status(&row.status)?,
            start_date: row.start_date,
            client: row.client,
        })
    }
}

pub async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {COLUMNS} FROM projects ORDER BY start_date DESC"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Project::try_from).collect()
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, ProjectRow>(&format!("SELECT {COLUMNS} FROM projects WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(Project::try_from)
        .transpose()
}

pub async fn create(pool: &PgPool, project: &NewProject<'_>) -> Result<Project, sqlx::Error> {
    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        "INSERT INTO projects (id, name, address, lat, lng, status, start_date, client)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {COLUMNS}"
    ))
    .bind(Uuid::now_v7())
    .bind(project.name)
    .bind(project.address)
    .bind(project.lat)
    .bind(project.lng)
    .bind(project.status.as_str())
    .bind(project.start_date)
    .bind(project.client)
    .fetch_one(pool)
    .await?;
    Project::try_from(row)
}
