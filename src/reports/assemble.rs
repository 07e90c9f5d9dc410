use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::aggregate::{ActionCount, CollectionStats, DayCount, ResourceCount, UserCount};
use super::filter::ReportFilter;
use super::page::{AccessPage, Pagination};
use super::store::AccessStore;
use super::{AccessQuery, CollectionRequest, Requester};
use crate::models::{AccessAction, AccessEvent, Enumerated, ResourceKind, UserSummary};

/// An access event with its user reference resolved. `user` is `null` when
/// the referenced user no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessEntry {
    pub id: Uuid,
    pub user: Option<UserSummary>,
    pub resource: ResourceKind,
    pub resource_id: Option<String>,
    pub action: AccessAction,
    pub timestamp: DateTime<Utc>,
}

/// Attach user projections to events, looking each distinct user up once.
pub async fn enrich(
    store: &dyn AccessStore,
    events: Vec<AccessEvent>,
) -> Result<Vec<AccessEntry>, sqlx::Error> {
    let mut users: HashMap<Uuid, Option<UserSummary>> = HashMap::new();
    for event in &events {
        if !users.contains_key(&event.user_id) {
            let user = store.lookup_user(event.user_id).await?;
            users.insert(event.user_id, user);
        }
    }

    Ok(events
        .into_iter()
        .map(|event| AccessEntry {
            user: users.get(&event.user_id).cloned().flatten(),
            id: event.id,
            resource: event.resource,
            resource_id: event.resource_id,
            action: event.action,
            timestamp: event.timestamp,
        })
        .collect())
}

/// The raw filter inputs echoed back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EchoedFilters {
    pub desde: Option<String>,
    pub hasta: Option<String>,
    pub recurso: Option<String>,
    pub accion: Option<String>,
    pub usuario: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListReport {
    pub success: bool,
    pub data: Vec<AccessEntry>,
    pub pagination: Pagination,
    pub filters: EchoedFilters,
}

pub fn list_report(page: AccessPage, query: &AccessQuery) -> ListReport {
    ListReport {
        success: true,
        data: page.entries,
        pagination: page.pagination,
        filters: EchoedFilters {
            desde: query.desde.clone(),
            hasta: query.hasta.clone(),
            recurso: query.recurso.clone(),
            accion: query.accion.clone(),
            usuario: query.usuario.clone(),
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Period {
    pub desde: Option<String>,
    pub hasta: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_accesos: i64,
    pub acciones_por_tipo: Vec<ActionCount>,
    pub top_usuarios: Vec<UserCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_recursos: Option<Vec<ResourceCount>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedBy {
    pub usuario: String,
    pub rol: String,
    pub fecha: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionReport {
    pub success: bool,
    pub tipo: ResourceKind,
    pub coleccion_id: Option<String>,
    pub periodo: Period,
    pub resumen: Summary,
    pub linea_tiempo: Vec<DayCount>,
    pub generado_por: GeneratedBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detalles: Option<Vec<AccessEntry>>,
}

pub fn collection_report(
    tipo: ResourceKind,
    filter: &ReportFilter,
    request: &CollectionRequest,
    stats: CollectionStats,
    requester: &Requester,
) -> CollectionReport {
    let top_recursos = stats.top_resources.filter(|r| !r.is_empty());

    CollectionReport {
        success: true,
        tipo,
        coleccion_id: filter.resource_id().map(str::to_string),
        periodo: Period {
            desde: request.desde.clone().filter(|d| !d.is_empty()),
            hasta: request.hasta.clone().filter(|h| !h.is_empty()),
        },
        resumen: Summary {
            total_accesos: stats.total,
            acciones_por_tipo: stats.by_action,
            top_usuarios: stats.top_users,
            top_recursos,
        },
        linea_tiempo: stats.timeline,
        generado_por: GeneratedBy {
            usuario: requester.email.clone(),
            rol: requester.role.as_str().to_string(),
            fecha: Utc::now(),
        },
        detalles: stats.details,
    }
}
