use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::jwt;
use crate::db;
use crate::error::AppError;
use crate::models::{Enumerated, Role};
use crate::state::SharedState;

/// Roles allowed to read access reports and the project catalogue.
pub const REPORT_ROLES: &[Role] = &[Role::Admin, Role::Analista];

/// An authenticated caller, re-loaded from the database on every request so
/// deleted users and role changes take effect immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role '{}' is not allowed to access this resource",
                self.role.as_str()
            )))
        }
    }
}

fn bearer_or_cookie(parts: &Parts) -> Result<Option<String>, AppError> {
    if let Some(auth_header) = parts.headers.get("authorization") {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            return Ok(Some(token.to_string()));
        }
    }

    let jar = CookieJar::from_headers(&parts.headers);
    Ok(jar.get("access_token").map(|c| c.value().to_string()))
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_or_cookie(parts)?
            .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

        let claims = jwt::verify(&token, &state.config.jwt_secret).map_err(|e| {
            tracing::debug!("{e}");
            AppError::Unauthorized("Invalid token".to_string())
        })?;

        let user = db::users::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(|| {
                AppError::Unauthorized("User not found. Please login again.".to_string())
            })?;

        let role = Role::parse(&user.role)
            .ok_or_else(|| AppError::Internal(format!("User {} has unknown role", user.id)))?;

        Ok(AuthUser {
            user_id: user.id,
            email: user.email,
            name: user.name,
            role,
        })
    }
}
