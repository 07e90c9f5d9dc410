use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::db::vehicles::{ProjectFilter, VehicleFilter, VehicleSort};
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{AccessAction, ResourceKind, Vehicle, VehicleStatus};
use crate::reports::filter::parse_enum;
use crate::reports::{PageParams, PageRequest, Pagination, SortOrder};
use crate::state::SharedState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub tipo: Option<String>,
    pub estado: Option<String>,
    pub proyecto: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EchoedFilters {
    pub tipo: Option<String>,
    pub estado: Option<String>,
    pub proyecto: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VehicleList {
    pub success: bool,
    pub data: Vec<Vehicle>,
    pub pagination: Pagination,
    pub filters: EchoedFilters,
}

fn build_filter(params: &ListParams) -> Result<VehicleFilter, AppError> {
    let status: Option<VehicleStatus> = params
        .estado
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| parse_enum("estado", s))
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let project = match params.proyecto.as_deref() {
        None | Some("") => ProjectFilter::Any,
        Some("null") | Some("none") => ProjectFilter::Unassigned,
        Some(id) => ProjectFilter::Assigned(id.to_string()),
    };

    Ok(VehicleFilter {
        vehicle_type: params.tipo.clone().filter(|t| !t.is_empty()),
        status,
        project,
    })
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<VehicleList>, AppError> {
    let page = PageRequest::parse(
        &PageParams {
            page: params.page.as_deref(),
            limit: params.limit.as_deref(),
            sort_by: params.sort_by.as_deref(),
            sort_order: params.sort_order.as_deref(),
        },
        VehicleSort::LicensePlate,
        SortOrder::Asc,
    )
    .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let filter = build_filter(&params)?;

    let (total, vehicles) = tokio::try_join!(
        db::vehicles::count(&state.pool, &filter),
        db::vehicles::list(&state.pool, &filter, &page),
    )?;

    audit::record_access(
        &state.pool,
        auth.user_id,
        ResourceKind::Vehicle,
        None,
        AccessAction::Read,
    )
    .await;

    Ok(Json(VehicleList {
        success: true,
        data: vehicles,
        pagination: Pagination::new(total, page.page, page.limit),
        filters: EchoedFilters {
            tipo: params.tipo,
            estado: params.estado,
            proyecto: params.proyecto,
        },
    }))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, AppError> {
    let vehicle = db::vehicles::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle not found".to_string()))?;

    audit::record_access(
        &state.pool,
        auth.user_id,
        ResourceKind::Vehicle,
        Some(&id.to_string()),
        AccessAction::Read,
    )
    .await;

    Ok(Json(vehicle))
}
