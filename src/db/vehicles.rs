use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::projects;
use crate::models::{AssignedProject, Enumerated, Vehicle, VehicleStatus};
use crate::reports::PageRequest;

const SELECT: &str = "SELECT v.id, v.license_plate, v.vehicle_type, v.status,
        p.id AS project_id, p.name AS project_name,
        p.address AS project_address, p.status AS project_status
     FROM vehicles v
     LEFT JOIN projects p ON v.assigned_project_id = p.id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleSort {
    LicensePlate,
    Type,
    Status,
}

impl VehicleSort {
    fn column(&self) -> &'static str {
        match self {
            VehicleSort::LicensePlate => "v.license_plate",
            VehicleSort::Type => "v.vehicle_type",
            VehicleSort::Status => "v.status",
        }
    }
}

impl Enumerated for VehicleSort {
    const VALUES: &'static [&'static str] = &["licensePlate", "type", "status"];

    fn as_str(&self) -> &'static str {
        match self {
            VehicleSort::LicensePlate => "licensePlate",
            VehicleSort::Type => "type",
            VehicleSort::Status => "status",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "licensePlate" => Some(VehicleSort::LicensePlate),
            "type" => Some(VehicleSort::Type),
            "status" => Some(VehicleSort::Status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProjectFilter {
    #[default]
    Any,
    Unassigned,
    /// Matched against the project id's text form.
    Assigned(String),
}

#[derive(Debug, Clone, Default)]
pub struct VehicleFilter {
    pub vehicle_type: Option<String>,
    pub status: Option<VehicleStatus>,
    pub project: ProjectFilter,
}

#[derive(sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    license_plate: String,
    vehicle_type: String,
    status: String,
    project_id: Option<Uuid>,
    project_name: Option<String>,
    project_address: Option<String>,
    project_status: Option<String>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = sqlx::Error;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        let status = VehicleStatus::parse(&row.status).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown vehicle status '{}'", row.status).into())
        })?;

        let assigned_to_project = match (row.project_id, row.project_name, row.project_status) {
            (Some(id), Some(name), Some(project_status)) => Some(AssignedProject {
                id,
                name,
                address: row.project_address.unwrap_or_default(),
                status: projects::decode_status(&project_status)?,
            }),
            _ => None,
        };

        Ok(Vehicle {
            id: row.id,
            license_plate: row.license_plate,
            vehicle_type: row.vehicle_type,
            status,
            assigned_to_project,
        })
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &VehicleFilter) {
    qb.push(" WHERE TRUE");
    if let Some(vehicle_type) = &filter.vehicle_type {
        qb.push(" AND v.vehicle_type = ").push_bind(vehicle_type.clone());
    }
    if let Some(status) = filter.status {
        qb.push(" AND v.status = ").push_bind(status.as_str());
    }
    match &filter.project {
        ProjectFilter::Any => {}
        ProjectFilter::Unassigned => {
            qb.push(" AND v.assigned_project_id IS NULL");
        }
        ProjectFilter::Assigned(project_id) => {
            qb.push(" AND v.assigned_project_id::text = ")
                .push_bind(project_id.clone());
        }
    }
}

pub async fn list(
    pool: &PgPool,
    filter: &VehicleFilter,
    page: &PageRequest<VehicleSort>,
) -> Result<Vec<Vehicle>, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new(SELECT);
    push_filter(&mut qb, filter);
    qb.push(format!(
        " ORDER BY {} {}, v.id ASC",
        page.sort.column(),
        page.order.as_sql()
    ));
    qb.push(" LIMIT ").push_bind(page.limit);
    qb.push(" OFFSET ").push_bind(page.skip());

    let rows: Vec<VehicleRow> = qb.build_query_as().fetch_all(pool).await?;
    rows.into_iter().map(Vehicle::try_from).collect()
}

pub async fn count(pool: &PgPool, filter: &VehicleFilter) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM vehicles v");
    push_filter(&mut qb, filter);
    let (total,): (i64,) = qb.build_query_as().fetch_one(pool).await?;
    Ok(total)
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Vehicle>, sqlx::Error> {
    let row = sqlx::query_as::<_, VehicleRow>(&format!("{SELECT} WHERE v.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Vehicle::try_from).transpose()
}

pub async fn create(
    pool: &PgPool,
    license_plate: &str,
    vehicle_type: &str,
    status: VehicleStatus,
    assigned_project_id: Option<Uuid>,
) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::now_v7();
    sqlx::query(
        "INSERT INTO vehicles (id, license_plate, vehicle_type, status, assigned_project_id)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id)
    .bind(license_plate)
    .bind(vehicle_type)
    .bind(status.as_str())
    .bind(assigned_project_id)
    .execute(pool)
    .await?;
    Ok(id)
}
