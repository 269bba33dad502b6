use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{ApiError, ApiJson},
    models::{MessageBody, UpdateUserRequest, User, UserMessage},
    services::accounts,
};

/// list_users
///
/// [Admin Route] Active accounts.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses((status = 200, description = "Active users", body = [User]))
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    Ok(Json(accounts::list_users(state.repo.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/admin/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(accounts::get_user(state.repo.as_ref(), user_id).await?))
}

/// update_user
///
/// [Admin Route] A role change here does not touch tokens already issued.
#[utoipa::path(
    put,
    path = "/admin/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = UserMessage),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserMessage>, ApiError> {
    let user = accounts::update_user(state.repo.as_ref(), user_id, payload).await?;
    Ok(Json(UserMessage {
        message: "User updated successfully".to_string(),
        user,
    }))
}

#[utoipa::path(
    delete,
    path = "/admin/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deactivated", body = MessageBody),
        (status = 404, description = "User not found")
    )
)]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<MessageBody>, ApiError> {
    accounts::deactivate_user(state.repo.as_ref(), user_id).await?;
    Ok(Json(MessageBody::new("User deactivated successfully")))
}
