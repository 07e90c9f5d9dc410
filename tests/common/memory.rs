use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use buildtrack::models::{AccessAction, AccessEvent, Enumerated, ResourceKind, UserSummary};
use buildtrack::reports::{
    AccessSort, AccessStore, GroupCount, GroupKey, ReportFilter, SortOrder, SortSpec,
};

/// An [`AccessStore`] over a fixed in-memory event list. Aggregations come
/// back in hash order so callers cannot rely on store ordering.
#[derive(Default)]
pub struct MemoryAccessStore {
    events: Vec<AccessEvent>,
    users: HashMap<Uuid, UserSummary>,
    calls: AtomicUsize,
}

impl MemoryAccessStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user and return its id.
    pub fn add_user(&mut self, email: &str, role: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.users.insert(
            id,
            UserSummary {
                id,
                email: email.to_string(),
                name: email.split('@').next().unwrap_or(email).to_string(),
                role: role.to_string(),
            },
        );
        id
    }

    pub fn add_event(
        &mut self,
        user_id: Uuid,
        resource: ResourceKind,
        resource_id: Option<&str>,
        action: AccessAction,
        timestamp: &str,
    ) -> Uuid {
        let id = Uuid::now_v7();
        self.events.push(AccessEvent {
            id,
            user_id,
            resource,
            resource_id: resource_id.map(str::to_string),
            action,
            timestamp: ts(timestamp),
        });
        id
    }

    /// Number of store operations issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(AtomicOrdering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, AtomicOrdering::SeqCst);
    }

    fn matching<'a>(&'a self, filter: &'a ReportFilter) -> impl Iterator<Item = &'a AccessEvent> {
        self.events.iter().filter(move |e| filter.matches(e))
    }
}

pub fn ts(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .expect("bad test timestamp")
        .with_timezone(&Utc)
}

fn compare(a: &AccessEvent, b: &AccessEvent, sort: SortSpec) -> Ordering {
    let by_field = match sort.field {
        AccessSort::Timestamp => a.timestamp.cmp(&b.timestamp),
        AccessSort::Resource => a.resource.as_str().cmp(b.resource.as_str()),
        AccessSort::Action => a.action.as_str().cmp(b.action.as_str()),
    };
    let by_field = match sort.order {
        SortOrder::Asc => by_field,
        SortOrder::Desc => by_field.reverse(),
    };
    by_field.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl AccessStore for MemoryAccessStore {
    async fn count(&self, filter: &ReportFilter) -> Result<i64, sqlx::Error> {
        self.touch();
        Ok(self.matching(filter).count() as i64)
    }

    async fn find(
        &self,
        filter: &ReportFilter,
        sort: SortSpec,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<AccessEvent>, sqlx::Error> {
        self.touch();
        let mut events: Vec<AccessEvent> = self.matching(filter).cloned().collect();
        events.sort_by(|a, b| compare(a, b, sort));
        Ok(events
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn aggregate(
        &self,
        filter: &ReportFilter,
        key: GroupKey,
    ) -> Result<Vec<GroupCount>, sqlx::Error> {
        self.touch();
        let mut groups: HashMap<Option<String>, i64> = HashMap::new();
        for event in self.matching(filter) {
            *groups.entry(key.key_of(event)).or_default() += 1;
        }
        Ok(groups
            .into_iter()
            .map(|(key, count)| GroupCount { key, count })
            .collect())
    }

    async fn lookup_user(&self, user_id: Uuid) -> Result<Option<UserSummary>, sqlx::Error> {
        self.touch();
        Ok(self.users.get(&user_id).cloned())
    }
}
