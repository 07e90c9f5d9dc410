use async_trait::async_trait;
use uuid::Uuid;

use super::filter::ReportFilter;
use super::page::{AccessSort, SortOrder};
use crate::models::{AccessEvent, Enumerated, UserSummary};

/// Dimension an aggregation groups events by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Action,
    User,
    ResourceId,
    /// Calendar day of the stored UTC timestamp, as `YYYY-MM-DD`.
    Day,
}

impl GroupKey {
    /// The group an event falls into, or `None` if it has no value for
    /// this dimension. In-process stores group with this; `PgAccessStore`
    /// computes the same keys in SQL.
    pub fn key_of(&self, event: &AccessEvent) -> Option<String> {
        match self {
            GroupKey::Action => Some(event.action.as_str().to_string()),
            GroupKey::User => Some(event.user_id.to_string()),
            GroupKey::ResourceId => event.resource_id.clone(),
            GroupKey::Day => Some(event.timestamp.format("%Y-%m-%d").to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct GroupCount {
    pub key: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: AccessSort,
    pub order: SortOrder,
}

/// Read access to recorded events and the users they reference.
#[async_trait]
pub trait AccessStore: Send + Sync {
    async fn count(&self, filter: &ReportFilter) -> Result<i64, sqlx::Error>;

    /// Matching events ordered by `sort`, ties broken by id ascending.
    async fn find(
        &self,
        filter: &ReportFilter,
        sort: SortSpec,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<AccessEvent>, sqlx::Error>;

    /// Event counts per group, in no particular order.
    async fn aggregate(
        &self,
        filter: &ReportFilter,
        key: GroupKey,
    ) -> Result<Vec<GroupCount>, sqlx::Error>;

    async fn lookup_user(&self, user_id: Uuid) -> Result<Option<UserSummary>, sqlx::Error>;
}
