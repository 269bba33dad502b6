//! Access token issuance and verification (HS256 JWT).

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Role;

/// Fixed validity window of an access token: 10 hours. There is no refresh token.
pub const ACCESS_TOKEN_TTL_SECS: u64 = 10 * 60 * 60;

/// Claims
///
/// Token payload. `role` is trusted as-is by the route gates until `exp`, so a role change
/// in storage only takes effect once the user logs in again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: Uuid,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token creation failed: {0}")]
    Creation(String),

    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Issues a token for `user_id` valid for `ACCESS_TOKEN_TTL_SECS` from now.
pub fn issue_token(secret: &str, user_id: Uuid, role: Role) -> Result<String, TokenError> {
    issue_token_at(secret, user_id, role, now_secs())
}

/// Issues a token as if it had been created at `issued_at` (unix seconds).
pub fn issue_token_at(
    secret: &str,
    user_id: Uuid,
    role: Role,
    issued_at: u64,
) -> Result<String, TokenError> {
    let claims = Claims {
        sub: user_id,
        role,
        iat: issued_at as usize,
        exp: (issued_at + ACCESS_TOKEN_TTL_SECS) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| TokenError::Creation(e.to_string()))
}

/// Checks signature and expiry and returns the embedded claims.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    // No grace period: the window ends exactly at `exp`.
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(e.to_string()),
    })
}
