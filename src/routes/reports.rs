use axum::extract::{Query, State};
use axum::Json;

use crate::auth::extractor::{AuthUser, REPORT_ROLES};
use crate::error::AppError;
use crate::reports::{self, AccessQuery, CollectionReport, CollectionRequest, ListReport, Requester};
use crate::state::SharedState;

pub async fn access(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<AccessQuery>,
) -> Result<Json<ListReport>, AppError> {
    auth.require_role(REPORT_ROLES)?;

    let report = tokio::time::timeout(
        state.config.report_timeout,
        reports::access_report(state.access_store.as_ref(), &query),
    )
    .await
    .map_err(|_| AppError::Timeout("Access report took too long to generate".to_string()))?
    .map_err(AppError::report("Failed to fetch access report"))?;

    Ok(Json(report))
}

pub async fn collection(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(request): Json<CollectionRequest>,
) -> Result<Json<CollectionReport>, AppError> {
    auth.require_role(REPORT_ROLES)?;

    let requester = Requester {
        email: auth.email.clone(),
        role: auth.role,
    };

    let report = tokio::time::timeout(
        state.config.report_timeout,
        reports::collection_report(state.access_store.as_ref(), &request, &requester),
    )
    .await
    .map_err(|_| AppError::Timeout("Collection report took too long to generate".to_string()))?
    .map_err(AppError::report("Failed to generate collection report"))?;

    tracing::info!(
        user_id = %auth.user_id,
        tipo = ?report.tipo,
        total = report.resumen.total_accesos,
        "Collection report generated"
    );

    Ok(Json(report))
}
