use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Enumerated, Role, User, UserSummary};

pub async fn create(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    name: &str,
    role: Role,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, password_hash, name, role)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(email)
    .bind(password_hash)
    .bind(name)
    .bind(role.as_str())
    .fetch_one(pool)
    .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Public projection used to decorate access events.
pub async fn find_summary(pool: &PgPool, id: Uuid) -> Result<Option<UserSummary>, sqlx::Error> {
    sqlx::query_as::<_, UserSummary>("SELECT id, email, name, role FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}
