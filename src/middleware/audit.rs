use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{AccessAction, Enumerated, ResourceKind};

/// Record that a user touched a resource. Called by handlers after the
/// resource has been served; a failed write is logged and never fails the
/// request.
pub async fn record_access(
    pool: &PgPool,
    user_id: Uuid,
    resource: ResourceKind,
    resource_id: Option<&str>,
    action: AccessAction,
) {
    if let Err(e) = crate::db::access::record(pool, user_id, resource, resource_id, action).await {
        tracing::error!(
            %user_id,
            resource = resource.as_str(),
            action = action.as_str(),
            "Failed to record access event: {e}"
        );
    }
}
