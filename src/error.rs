use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::reports::ReportError;

#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    Conflict(String),
    RateLimited(String),
    Timeout(String),
    Internal(String),
    Database(sqlx::Error),
    /// A store failure while building a report. The underlying error text is
    /// returned to the caller alongside `context`.
    Store {
        context: &'static str,
        source: sqlx::Error,
    },
}

impl AppError {
    /// Map a report failure, labelling store errors with `context`.
    pub fn report(context: &'static str) -> impl FnOnce(ReportError) -> AppError {
        move |err| match err {
            ReportError::Validation(e) => {
                tracing::debug!("Rejected report request: {e}");
                AppError::BadRequest(e.to_string())
            }
            ReportError::Store(source) => AppError::Store { context, source },
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::RateLimited(msg) => write!(f, "Rate Limited: {msg}"),
            AppError::Timeout(msg) => write!(f, "Timeout: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Database(err) => write!(f, "Database Error: {err}"),
            AppError::Store { context, source } => write!(f, "{context}: {source}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            AppError::RateLimited(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, json!({ "error": msg }))
            }
            AppError::Timeout(msg) => {
                tracing::warn!("Request timed out: {msg}");
                (StatusCode::GATEWAY_TIMEOUT, json!({ "error": msg }))
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Internal server error" }),
                )
            }
            AppError::Store { context, source } => {
                tracing::error!(error = ?source, "{context}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": context, "message": source.to_string() }),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}
