use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiJson},
    models::{AddMemberRequest, CreateGroupRequest, GroupDetail, GroupMessage, MessageBody},
    services::groups,
};

/// create_group
///
/// [Admin Route] The caller becomes the group owner.
#[utoipa::path(
    post,
    path = "/group/create",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Created", body = GroupMessage),
        (status = 409, description = "Group already exists")
    )
)]
pub async fn create_group(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupMessage>), ApiError> {
    let group = groups::create_group(state.repo.as_ref(), id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(GroupMessage {
            message: "Group created successfully".to_string(),
            group,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/group/all",
    responses((status = 200, description = "Groups with members", body = [GroupDetail]))
)]
pub async fn get_all_groups(
    State(state): State<AppState>,
) -> Result<Json<Vec<GroupDetail>>, ApiError> {
    Ok(Json(groups::list_groups(state.repo.as_ref()).await?))
}

#[utoipa::path(
    get,
    path = "/group/{group_id}",
    params(("group_id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Group with members", body = GroupDetail),
        (status = 404, description = "Group not found")
    )
)]
pub async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<GroupDetail>, ApiError> {
    Ok(Json(groups::get_group(state.repo.as_ref(), group_id).await?))
}

/// delete_group
///
/// [Admin Route] Owner only. Removes the group and its ledger entries.
#[utoipa::path(
    delete,
    path = "/group/delete/{group_id}",
    params(("group_id" = Uuid, Path, description = "Group ID")),
    responses(
        (status = 200, description = "Deleted", body = MessageBody),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Group not found")
    )
)]
pub async fn delete_group(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<MessageBody>, ApiError> {
    groups::delete_group(state.repo.as_ref(), group_id, id).await?;
    Ok(Json(MessageBody::new("Group deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/group/{group_id}/members",
    params(("group_id" = Uuid, Path, description = "Group ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Member added", body = GroupMessage),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Group or user not found")
    )
)]
pub async fn add_member(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    ApiJson(payload): ApiJson<AddMemberRequest>,
) -> Result<Json<GroupMessage>, ApiError> {
    let group = groups::add_member(state.repo.as_ref(), group_id, payload.user_id, id).await?;
    Ok(Json(GroupMessage {
        message: "User added to group".to_string(),
        group,
    }))
}

#[utoipa::path(
    delete,
    path = "/group/delete/{group_id}/{user_id}",
    params(
        ("group_id" = Uuid, Path, description = "Group ID"),
        ("user_id" = Uuid, Path, description = "Member to remove")
    ),
    responses(
        (status = 200, description = "Member removed", body = GroupMessage),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Group not found")
    )
)]
pub async fn remove_member(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GroupMessage>, ApiError> {
    let group = groups::remove_member(state.repo.as_ref(), group_id, user_id, id).await?;
    Ok(Json(GroupMessage {
        message: "User removed from group".to_string(),
        group,
    }))
}
