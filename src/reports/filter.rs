use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::ValidationError;
use crate::models::{AccessAction, AccessEvent, Enumerated, ResourceKind};

/// Raw, untrusted filter inputs as they arrive from a query string or body.
/// Empty strings are treated the same as missing values.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawFilter<'a> {
    pub from: Option<&'a str>,
    pub to: Option<&'a str>,
    pub resource: Option<&'a str>,
    pub action: Option<&'a str>,
    pub user: Option<&'a str>,
    pub resource_id: Option<&'a str>,
}

/// A validated predicate over access events. Immutable once built; the
/// default value matches every event.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReportFilter {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    resource: Option<ResourceKind>,
    action: Option<AccessAction>,
    user: Option<String>,
    resource_id: Option<String>,
}

impl ReportFilter {
    pub fn parse(raw: &RawFilter<'_>) -> Result<Self, ValidationError> {
        let from = present(raw.from)
            .map(|v| parse_date_field("desde", v))
            .transpose()?;
        let to = present(raw.to)
            .map(|v| parse_date_field("hasta", v))
            .transpose()?;

        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(ValidationError::InvalidDateRange);
            }
        }

        let resource = present(raw.resource)
            .map(|v| parse_enum("recurso", v))
            .transpose()?;
        let action = present(raw.action)
            .map(|v| parse_enum("accion", v))
            .transpose()?;

        Ok(ReportFilter {
            from,
            to,
            resource,
            action,
            user: present(raw.user).map(str::to_string),
            resource_id: present(raw.resource_id).map(str::to_string),
        })
    }

    pub fn from(&self) -> Option<DateTime<Utc>> {
        self.from
    }

    pub fn to(&self) -> Option<DateTime<Utc>> {
        self.to
    }

    pub fn resource(&self) -> Option<ResourceKind> {
        self.resource
    }

    pub fn action(&self) -> Option<AccessAction> {
        self.action
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    /// Evaluate the predicate against a single event. Both date bounds are
    /// inclusive; the user id is compared by its hyphenated text form.
    ///
    /// For [`AccessStore`](super::AccessStore) implementations that filter
    /// in process. `PgAccessStore` pushes the same conditions into SQL and
    /// must agree with this.
    pub fn matches(&self, event: &AccessEvent) -> bool {
        if self.from.is_some_and(|from| event.timestamp < from) {
            return false;
        }
        if self.to.is_some_and(|to| event.timestamp > to) {
            return false;
        }
        if self.resource.is_some_and(|r| event.resource != r) {
            return false;
        }
        if self.action.is_some_and(|a| event.action != a) {
            return false;
        }
        if let Some(user) = &self.user {
            if event.user_id.to_string() != *user {
                return false;
            }
        }
        if let Some(resource_id) = &self.resource_id {
            if event.resource_id.as_deref() != Some(resource_id.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Parse one of a closed set of values, naming the offending field on failure.
pub fn parse_enum<T: Enumerated>(field: &'static str, value: &str) -> Result<T, ValidationError> {
    T::parse(value).ok_or_else(|| ValidationError::InvalidEnumValue {
        field,
        value: value.to_string(),
        allowed: T::VALUES,
    })
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` read as UTC, or a
/// bare `YYYY-MM-DD` meaning UTC midnight.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|n| n.and_utc())
}

fn parse_date_field(field: &'static str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    parse_timestamp(value).ok_or_else(|| ValidationError::InvalidDateFormat {
        field,
        value: value.to_string(),
    })
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
