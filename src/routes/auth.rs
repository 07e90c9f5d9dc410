use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{self, Claims};
use crate::auth::password;
use crate::config::RegistrationMode;
use crate::db;
use crate::error::AppError;
use crate::models::Role;
use crate::reports::filter::parse_enum;
use crate::state::SharedState;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    if state.config.registration == RegistrationMode::Closed {
        return Err(AppError::Forbidden(
            "Registration is disabled. Contact your administrator.".to_string(),
        ));
    }

    if req.email.is_empty() || req.password.is_empty() || req.name.is_empty() || req.role.is_empty()
    {
        return Err(AppError::BadRequest("All fields are required".to_string()));
    }

    let role: Role =
        parse_enum("role", &req.role).map_err(|e| AppError::BadRequest(e.to_string()))?;

    if db::users::find_by_email(&state.pool, &req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }

    let pw_hash = password::hash(&req.password)?;

    let user = db::users::create(&state.pool, &req.email, &pw_hash, &req.name, role)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("Email already in use".to_string())
            }
            _ => AppError::Database(e),
        })?;

    tracing::info!(user_id = %user.id, role = %user.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    if let Err(retry_after) = state.login_limiter.check(&req.email) {
        return Err(AppError::RateLimited(format!(
            "Too many login attempts. Try again in {retry_after} seconds."
        )));
    }

    let Some(user) = db::users::find_by_email(&state.pool, &req.email).await? else {
        state.login_limiter.record_failure(&req.email);
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    };

    if !password::verify(&req.password, &user.password_hash)? {
        state.login_limiter.record_failure(&req.email);
        return Err(AppError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }
    state.login_limiter.reset(&req.email);

    let role: Role = parse_enum("role", &user.role)
        .map_err(|_| AppError::Internal(format!("User {} has unknown role", user.id)))?;

    let claims = Claims::for_session(user.id, &user.email, role);
    let token = jwt::sign(&claims, &state.config.jwt_secret)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}
