use chrono::Utc;
use uuid::Uuid;

use super::required_text;
use crate::{
    auth::{password, token},
    error::ApiError,
    models::{LoginRequest, LoginResponse, SignupRequest, UpdateUserRequest, User},
    repository::{Repository, RepositoryError},
};

async fn hash_blocking(plain: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| ApiError::Internal(format!("hash task failed: {e}")))?
        .map_err(|e| ApiError::Internal(e.to_string()))
}

async fn verify_blocking(candidate: String, stored_hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || password::verify_password(&candidate, &stored_hash))
        .await
        .map_err(|e| ApiError::Internal(format!("verify task failed: {e}")))?
        .map_err(|e| ApiError::Internal(e.to_string()))
}

fn email_conflict(err: RepositoryError) -> ApiError {
    match err {
        RepositoryError::Duplicate(_) => ApiError::Conflict("Email already registered".to_string()),
        other => other.into(),
    }
}

/// signup
///
/// Registers an account. The email is trimmed, the role defaults to `user`, and the
/// password is stored only as an Argon2 hash.
pub async fn signup(repo: &dyn Repository, req: SignupRequest) -> Result<User, ApiError> {
    const MISSING: &str = "Name, email and password are required";
    let name = required_text(req.name, MISSING)?;
    let email = required_text(req.email, MISSING)?;
    let plain = req
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest(MISSING.to_string()))?;

    if repo.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        name,
        email,
        password_hash: hash_blocking(plain).await?,
        role: req.role.unwrap_or_default(),
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    // The unique index still catches a concurrent signup with the same email.
    let user = repo.create_user(user).await.map_err(email_conflict)?;
    tracing::info!(user_id = %user.id, role = %user.role, "user registered");
    Ok(user)
}

/// login
///
/// Unknown or inactive email: 404. Wrong password: 401. On success a 10 hour access
/// token carrying the stored role is issued.
pub async fn login(
    repo: &dyn Repository,
    jwt_secret: &str,
    req: LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let email = required_text(req.email, "Email and password are required")?;
    let candidate = req.password.unwrap_or_default();

    let user = repo
        .find_user_by_email(&email)
        .await?
        .filter(|u| u.is_active);

    let Some(user) = user else {
        tokio::task::spawn_blocking(move || password::verify_against_dummy(&candidate))
            .await
            .map_err(|e| ApiError::Internal(format!("verify task failed: {e}")))?;
        return Err(ApiError::NotFound("User not found or inactive".to_string()));
    };

    if !verify_blocking(candidate, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "login rejected: wrong password");
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let access_token = token::issue_token(jwt_secret, user.id, user.role)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(LoginResponse {
        message: "Login successful".to_string(),
        access_token,
        id: user.id,
    })
}

/// The caller's stored profile.
pub async fn me(repo: &dyn Repository, user_id: Uuid) -> Result<User, ApiError> {
    repo.get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

pub async fn list_users(repo: &dyn Repository) -> Result<Vec<User>, ApiError> {
    Ok(repo.list_users().await?)
}

/// Active users only; a deactivated account reads as absent.
pub async fn get_user(repo: &dyn Repository, user_id: Uuid) -> Result<User, ApiError> {
    repo.get_user(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// update_user
///
/// Admin edit of name, email, role or password. Tokens issued before a role change keep
/// their old role until they expire.
pub async fn update_user(
    repo: &dyn Repository,
    user_id: Uuid,
    req: UpdateUserRequest,
) -> Result<User, ApiError> {
    let mut user = repo
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if let Some(name) = req.name {
        user.name = required_text(Some(name), "Name cannot be empty")?;
    }
    if let Some(email) = req.email {
        user.email = required_text(Some(email), "Email cannot be empty")?;
    }
    if let Some(role) = req.role {
        user.role = role;
    }
    if let Some(plain) = req.password.filter(|p| !p.is_empty()) {
        user.password_hash = hash_blocking(plain).await?;
    }
    user.updated_at = Utc::now();

    let saved = repo
        .save_user(user)
        .await
        .map_err(email_conflict)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    tracing::info!(user_id = %saved.id, role = %saved.role, "user updated");
    Ok(saved)
}

/// Soft delete: flips the active flag. The record is kept.
pub async fn deactivate_user(repo: &dyn Repository, user_id: Uuid) -> Result<(), ApiError> {
    let mut user = repo
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    user.is_active = false;
    user.updated_at = Utc::now();
    repo.save_user(user)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    tracing::info!(user_id = %user_id, "user deactivated");
    Ok(())
}
