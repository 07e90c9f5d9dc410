use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Enumerated, Role};

/// Session tokens expire one hour after login.
const SESSION_LIFETIME_HOURS: i64 = 1;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("failed to sign session token: {0}")]
    Sign(jsonwebtoken::errors::Error),

    #[error("rejected session token: {0}")]
    Rejected(jsonwebtoken::errors::Error),
}

/// HS256 session claims. `role` is informational; authorization always uses
/// the role currently stored for `sub`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
}

impl Claims {
    pub fn for_session(user_id: Uuid, email: &str, role: Role) -> Self {
        Self {
            sub: user_id,
            email: email.to_string(),
            role: role.as_str().to_string(),
            exp: (Utc::now() + Duration::hours(SESSION_LIFETIME_HOURS)).timestamp(),
        }
    }
}

pub fn sign(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(TokenError::Sign)
}

/// Check the signature and expiry of a session token.
pub fn verify(token: &str, secret: &str) -> Result<Claims, TokenError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(TokenError::Rejected)
}
