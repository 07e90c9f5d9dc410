use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{AccessAction, AccessEvent, Enumerated, ResourceKind, UserSummary};
use crate::reports::{AccessSort, AccessStore, GroupCount, GroupKey, ReportFilter, SortSpec};

const COLUMNS: &str = "id, user_id, resource, resource_id, action, occurred_at";

pub async fn record(
    pool: &PgPool,
    user_id: Uuid,
    resource: ResourceKind,
    resource_id: Option<&str>,
    action: AccessAction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO access_events (id, user_id, resource, resource_id, action)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(Uuid::now_v7())
    .bind(user_id)
    .bind(resource.as_str())
    .bind(resource_id)
    .bind(action.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
struct AccessRow {
    id: Uuid,
    user_id: Uuid,
    resource: String,
    resource_id: Option<String>,
    action: String,
    occurred_at: DateTime<Utc>,
}

impl TryFrom<AccessRow> for AccessEvent {
    type Error = sqlx::Error;

    fn try_from(row: AccessRow) -> Result<Self, Self::Error> {
        let resource = ResourceKind::parse(&row.resource).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown resource kind '{}'", row.resource).into())
        })?;
        let action = AccessAction::parse(&row.action).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown access action '{}'", row.action).into())
        })?;

        Ok(AccessEvent {
            id: row.id,
            user_id: row.user_id,
            resource,
            resource_id: row.resource_id,
            action,
            timestamp: row.occurred_at,
        })
    }
}

/// [`AccessStore`] over the `access_events` table.
#[derive(Clone)]
pub struct PgAccessStore {
    pool: PgPool,
}

impl PgAccessStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ReportFilter) {
    qb.push(" WHERE TRUE");
    if let Some(from) = filter.from() {
        qb.push(" AND occurred_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to() {
        qb.push(" AND occurred_at <= ").push_bind(to);
    }
    if let Some(resource) = filter.resource() {
        qb.push(" AND resource = ").push_bind(resource.as_str());
    }
    if let Some(action) = filter.action() {
        qb.push(" AND action = ").push_bind(action.as_str());
    }
    // Opaque ids: input that is not a UUID matches nothing instead of failing.
    if let Some(user) = filter.user() {
        qb.push(" AND user_id::text = ").push_bind(user.to_string());
    }
    if let Some(resource_id) = filter.resource_id() {
        qb.push(" AND resource_id = ").push_bind(resource_id.to_string());
    }
}

fn sort_column(field: AccessSort) -> &'static str {
    match field {
        AccessSort::Timestamp => "occurred_at",
        AccessSort::Resource => "resource",
        AccessSort::Action => "action",
    }
}

fn group_expr(key: GroupKey) -> &'static str {
    match key {
        GroupKey::Action => "action",
        GroupKey::User => "user_id::text",
        GroupKey::ResourceId => "resource_id",
        GroupKey::Day => "to_char(occurred_at AT TIME ZONE 'UTC', 'YYYY-MM-DD')",
    }
}

#[async_trait]
impl AccessStore for PgAccessStore {
    async fn count(&self, filter: &ReportFilter) -> Result<i64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM access_events");
        push_filter(&mut qb, filter);
        let (total,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(total)
    }

    async fn find(
        &self,
        filter: &ReportFilter,
        sort: SortSpec,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<AccessEvent>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM access_events"));
        push_filter(&mut qb, filter);
        qb.push(format!(
            " ORDER BY {} {}, id ASC",
            sort_column(sort.field),
            sort.order.as_sql()
        ));
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(skip);

        let rows: Vec<AccessRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(AccessEvent::try_from).collect()
    }

    async fn aggregate(
        &self,
        filter: &ReportFilter,
        key: GroupKey,
    ) -> Result<Vec<GroupCount>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} AS key, COUNT(*) AS count FROM access_events",
            group_expr(key)
        ));
        push_filter(&mut qb, filter);
        qb.push(" GROUP BY 1");
        qb.build_query_as::<GroupCount>().fetch_all(&self.pool).await
    }

    async fn lookup_user(&self, user_id: Uuid) -> Result<Option<UserSummary>, sqlx::Error> {
        crate::db::users::find_summary(&self.pool, user_id).await
    }
}
