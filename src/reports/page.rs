use serde::Serialize;

use super::assemble::{self, AccessEntry};
use super::filter::ReportFilter;
use super::store::{AccessStore, SortSpec};
use super::{ReportError, ValidationError};
use crate::models::Enumerated;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// `asc` sorts ascending, any other non-empty value sorts descending.
    pub fn parse(value: Option<&str>, default: SortOrder) -> SortOrder {
        match value {
            None | Some("") => default,
            Some("asc") => SortOrder::Asc,
            Some(_) => SortOrder::Desc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Sortable columns of the access listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSort {
    Timestamp,
    Resource,
    Action,
}

impl Enumerated for AccessSort {
    const VALUES: &'static [&'static str] = &["timestamp", "resource", "action"];

    fn as_str(&self) -> &'static str {
        match self {
            AccessSort::Timestamp => "timestamp",
            AccessSort::Resource => "resource",
            AccessSort::Action => "action",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "timestamp" => Some(AccessSort::Timestamp),
            "resource" => Some(AccessSort::Resource),
            "action" => Some(AccessSort::Action),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PageParams<'a> {
    pub page: Option<&'a str>,
    pub limit: Option<&'a str>,
    pub sort_by: Option<&'a str>,
    pub sort_order: Option<&'a str>,
}

/// A validated page window plus ordering over columns `S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRequest<S> {
    pub page: i64,
    pub limit: i64,
    pub sort: S,
    pub order: SortOrder,
}

impl<S: Enumerated> PageRequest<S> {
    pub fn parse(
        params: &PageParams<'_>,
        default_sort: S,
        default_order: SortOrder,
    ) -> Result<Self, ValidationError> {
        let page = match params.page.filter(|p| !p.is_empty()) {
            None => 1,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or_else(|| ValidationError::InvalidPage(raw.to_string()))?,
        };

        let limit = match params.limit.filter(|l| !l.is_empty()) {
            None => DEFAULT_LIMIT,
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|l| (1..=MAX_LIMIT).contains(l))
                .ok_or_else(|| ValidationError::InvalidPageSize(raw.to_string()))?,
        };

        let sort = match params.sort_by.filter(|s| !s.is_empty()) {
            None => default_sort,
            Some(raw) => S::parse(raw).ok_or_else(|| ValidationError::InvalidSortField {
                value: raw.to_string(),
                allowed: S::VALUES,
            })?,
        };

        Ok(PageRequest {
            page,
            limit,
            sort,
            order: SortOrder::parse(params.sort_order, default_order),
        })
    }

    /// Number of matching records that precede this page. Saturates for
    /// page numbers far past the end of any result set.
    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if total <= 0 { 0 } else { (total + limit - 1) / limit };
        Pagination {
            total,
            page,
            limit,
            total_pages,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessPage {
    pub entries: Vec<AccessEntry>,
    pub pagination: Pagination,
}

/// Count every match, then fetch and enrich the requested window.
pub async fn list_page(
    store: &dyn AccessStore,
    filter: &ReportFilter,
    request: &PageRequest<AccessSort>,
) -> Result<AccessPage, ReportError> {
    let sort = SortSpec {
        field: request.sort,
        order: request.order,
    };

    let (total, events) = tokio::try_join!(
        store.count(filter),
        store.find(filter, sort, request.skip(), request.limit),
    )?;

    tracing::debug!(
        total,
        page = request.page,
        returned = events.len(),
        "access page fetched"
    );

    let entries = assemble::enrich(store, events).await?;
    Ok(AccessPage {
        entries,
        pagination: Pagination::new(total, request.page, request.limit),
    })
}
