use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::auth::extractor::{AuthUser, REPORT_ROLES};
use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{AccessAction, Project, ResourceKind};
use crate::state::SharedState;

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Project>>, AppError> {
    auth.require_role(REPORT_ROLES)?;

    let projects = db::projects::list(&state.pool).await?;

    audit::record_access(
        &state.pool,
        auth.user_id,
        ResourceKind::Project,
        None,
        AccessAction::Read,
    )
    .await;

    Ok(Json(projects))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, AppError> {
    auth.require_role(REPORT_ROLES)?;

    let project = db::projects::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    audit::record_access(
        &state.pool,
        auth.user_id,
        ResourceKind::Project,
        Some(&id.to_string()),
        AccessAction::Read,
    )
    .await;

    Ok(Json(project))
}
