use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::assemble::{self, AccessEntry};
use super::filter::ReportFilter;
use super::page::{AccessSort, SortOrder};
use super::store::{AccessStore, GroupCount, GroupKey, SortSpec};
use super::ReportError;
use crate::models::{AccessAction, Enumerated};

/// Length of the top-users and top-resources rankings.
pub const TOP_N: usize = 10;

/// Most recent events returned when details are requested.
pub const DETAIL_LIMIT: i64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionCount {
    pub accion: AccessAction,
    pub cantidad: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRef {
    pub id: Uuid,
    pub email: String,
    pub nombre: String,
    pub rol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCount {
    pub usuario: UserRef,
    pub cantidad: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCount {
    pub recurso_id: String,
    pub cantidad: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCount {
    pub fecha: String,
    pub cantidad: i64,
}

#[derive(Debug, Clone)]
pub struct CollectionStats {
    pub total: i64,
    pub by_action: Vec<ActionCount>,
    pub top_users: Vec<UserCount>,
    /// `None` when the filter pins a single resource instance.
    pub top_resources: Option<Vec<ResourceCount>>,
    pub timeline: Vec<DayCount>,
    pub details: Option<Vec<AccessEntry>>,
}

/// Compute every statistical view over the same filter. The queries are
/// independent and run concurrently.
pub async fn collect(
    store: &dyn AccessStore,
    filter: &ReportFilter,
    include_details: bool,
) -> Result<CollectionStats, ReportError> {
    let resources = async {
        if filter.resource_id().is_some() {
            return Ok::<_, sqlx::Error>(None);
        }
        store.aggregate(filter, GroupKey::ResourceId).await.map(Some)
    };

    let details = async {
        if !include_details {
            return Ok::<_, sqlx::Error>(None);
        }
        let newest_first = SortSpec {
            field: AccessSort::Timestamp,
            order: SortOrder::Desc,
        };
        store.find(filter, newest_first, 0, DETAIL_LIMIT).await.map(Some)
    };

    let (total, actions, users, resources, days, details) = tokio::try_join!(
        store.count(filter),
        store.aggregate(filter, GroupKey::Action),
        store.aggregate(filter, GroupKey::User),
        resources,
        store.aggregate(filter, GroupKey::Day),
        details,
    )?;

    let top_users = top_users(store, users).await?;
    let details = match details {
        Some(events) => Some(assemble::enrich(store, events).await?),
        None => None,
    };

    Ok(CollectionStats {
        total,
        by_action: by_action(actions),
        top_users,
        top_resources: resources.map(top_resources),
        timeline: timeline(days),
        details,
    })
}

/// Counts in declaration order of [`AccessAction`], omitting absent actions.
pub fn by_action(groups: Vec<GroupCount>) -> Vec<ActionCount> {
    let mut counts: HashMap<AccessAction, i64> = HashMap::new();
    for group in groups {
        let Some(action) = group.key.as_deref().and_then(AccessAction::parse) else {
            tracing::warn!(key = ?group.key, "ignoring unknown action group");
            continue;
        };
        *counts.entry(action).or_default() += group.count;
    }

    AccessAction::ALL
        .into_iter()
        .filter_map(|action| {
            counts.get(&action).map(|&cantidad| ActionCount {
                accion: action,
                cantidad,
            })
        })
        .collect()
}

/// Resolve the highest-count users until `TOP_N` are found. Groups whose
/// user no longer exists are skipped rather than counted toward the limit.
async fn top_users(
    store: &dyn AccessStore,
    groups: Vec<GroupCount>,
) -> Result<Vec<UserCount>, sqlx::Error> {
    let mut result = Vec::with_capacity(TOP_N);
    for (key, cantidad) in rank(groups) {
        if result.len() == TOP_N {
            break;
        }
        let Ok(user_id) = Uuid::parse_str(&key) else {
            continue;
        };
        let Some(user) = store.lookup_user(user_id).await? else {
            tracing::debug!(%user_id, "dropping access group for missing user");
            continue;
        };
        result.push(UserCount {
            usuario: UserRef {
                id: user.id,
                email: user.email,
                nombre: user.name,
                rol: user.role,
            },
            cantidad,
        });
    }
    Ok(result)
}

pub fn top_resources(groups: Vec<GroupCount>) -> Vec<ResourceCount> {
    rank(groups)
        .into_iter()
        .take(TOP_N)
        .map(|(recurso_id, cantidad)| ResourceCount {
            recurso_id,
            cantidad,
        })
        .collect()
}

/// One entry per day with at least one event, oldest first.
pub fn timeline(groups: Vec<GroupCount>) -> Vec<DayCount> {
    let mut days: Vec<DayCount> = groups
        .into_iter()
        .filter_map(|g| {
            g.key.map(|fecha| DayCount {
                fecha,
                cantidad: g.count,
            })
        })
        .collect();
    days.sort_by(|a, b| a.fecha.cmp(&b.fecha));
    days
}

/// Drop keyless groups and order by count descending. Equal counts are
/// ordered by key ascending so rankings are reproducible.
fn rank(groups: Vec<GroupCount>) -> Vec<(String, i64)> {
    let mut ranked: Vec<(String, i64)> = groups
        .into_iter()
        .filter_map(|g| g.key.map(|k| (k, g.count)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}
