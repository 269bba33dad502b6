use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError, models::Role};

pub mod password;
pub mod token;

/// AuthUser
///
/// The caller identity resolved from a valid bearer token. `role` comes from the token,
/// not from storage.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    /// The `RequireRole(expected)` check: plain equality against the token role.
    pub fn require_role(&self, expected: Role) -> Result<(), ApiError> {
        if self.role != expected {
            return Err(ApiError::Forbidden(format!("{expected} access required")));
        }
        Ok(())
    }
}

/// AuthUser Extractor
///
/// Implements the Authorization Gate:
/// 1. No `Authorization` header: 401 "No token provided".
/// 2. Header not of the form `Bearer <token>`, bad signature or expired token: 401 "Invalid token".
/// 3. Otherwise `{id, role}` from the claims.
///
/// When `require_auth` already ran for the route, the identity is taken from the request
/// extensions instead of decoding the token twice. There is no storage lookup: a role
/// change is picked up at the next login, at the latest 10 hours later.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;

        let claims = token::verify_token(&config.jwt_secret, token).map_err(|e| {
            tracing::debug!("rejected bearer token: {}", e);
            ApiError::Unauthorized("Invalid token".to_string())
        })?;

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

/// require_auth
///
/// Route layer for protected routers. Extraction failure rejects the request before any
/// handler runs; on success the identity is stored in the request extensions.
pub async fn require_auth(user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// require_role
///
/// Second gate, layered inside `require_auth`: `from_fn_with_state(Role::Admin, require_role)`.
pub async fn require_role(
    State(expected): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::Unauthorized("No token provided".to_string()))?;
    user.require_role(expected)?;
    Ok(next.run(request).await)
}
