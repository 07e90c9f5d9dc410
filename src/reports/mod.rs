//! Access-report engine: filter validation, paginated listing, and
//! statistical aggregation over recorded access events.
//!
//! Callers are expected to have authenticated the requester and checked
//! its role; nothing in here performs authorization.

pub mod aggregate;
pub mod assemble;
pub mod filter;
pub mod page;
pub mod store;

use serde::Deserialize;

use crate::models::{Enumerated, ResourceKind, Role};

pub use assemble::{AccessEntry, CollectionReport, ListReport};
pub use filter::{RawFilter, ReportFilter};
pub use page::{AccessSort, PageParams, PageRequest, Pagination, SortOrder};
pub use store::{AccessStore, GroupCount, GroupKey, SortSpec};

/// A client-side mistake in report parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid date format for '{field}': '{value}'. Use ISO 8601")]
    InvalidDateFormat { field: &'static str, value: String },

    #[error("'desde' must not be later than 'hasta'")]
    InvalidDateRange,

    #[error("Invalid value '{value}' for '{field}'. Allowed values: {}", .allowed.join(", "))]
    InvalidEnumValue {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("Invalid sort field '{value}'. Allowed values: {}", .allowed.join(", "))]
    InvalidSortField {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("Page must be an integer greater than 0, got '{0}'")]
    InvalidPage(String),

    #[error("Limit must be an integer between 1 and 100, got '{0}'")]
    InvalidPageSize(String),

    #[error("'{0}' is required")]
    MissingField(&'static str),
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("store query failed: {0}")]
    Store(#[from] sqlx::Error),
}

/// Query string of `GET /api/reports/access`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub desde: Option<String>,
    pub hasta: Option<String>,
    pub recurso: Option<String>,
    pub accion: Option<String>,
    pub usuario: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Body of `POST /api/reports/coleccion`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRequest {
    pub tipo: Option<String>,
    pub coleccion_id: Option<String>,
    pub desde: Option<String>,
    pub hasta: Option<String>,
    #[serde(default)]
    pub incluir_detalles: bool,
}

/// Who asked for a statistical report.
#[derive(Debug, Clone)]
pub struct Requester {
    pub email: String,
    pub role: Role,
}

/// Validate the query, then fetch one sorted page of matching events.
pub async fn access_report(
    store: &dyn AccessStore,
    query: &AccessQuery,
) -> Result<ListReport, ReportError> {
    let filter = ReportFilter::parse(&RawFilter {
        from: query.desde.as_deref(),
        to: query.hasta.as_deref(),
        resource: query.recurso.as_deref(),
        action: query.accion.as_deref(),
        user: query.usuario.as_deref(),
        resource_id: None,
    })?;

    let request = PageRequest::parse(
        &PageParams {
            page: query.page.as_deref(),
            limit: query.limit.as_deref(),
            sort_by: query.sort_by.as_deref(),
            sort_order: query.sort_order.as_deref(),
        },
        AccessSort::Timestamp,
        SortOrder::Desc,
    )?;

    let page = page::list_page(store, &filter, &request).await?;
    Ok(assemble::list_report(page, query))
}

/// Validate the request, then summarize every matching event of one
/// resource kind, optionally narrowed to a single resource instance.
pub async fn collection_report(
    store: &dyn AccessStore,
    request: &CollectionRequest,
    requester: &Requester,
) -> Result<CollectionReport, ReportError> {
    let tipo = request
        .tipo
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or(ValidationError::MissingField("tipo"))?;
    let kind: ResourceKind = filter::parse_enum("tipo", tipo)?;

    let filter = ReportFilter::parse(&RawFilter {
        from: request.desde.as_deref(),
        to: request.hasta.as_deref(),
        resource: Some(kind.as_str()),
        action: None,
        user: None,
        resource_id: request.coleccion_id.as_deref(),
    })?;

    let stats = aggregate::collect(store, &filter, request.incluir_detalles).await?;
    Ok(assemble::collection_report(kind, &filter, request, stats, requester))
}
