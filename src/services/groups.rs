use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use super::{policy::authorize_owner, required_text};
use crate::{
    error::ApiError,
    models::{CreateGroupRequest, Group, GroupDetail, UserSummary},
    repository::{Repository, RepositoryError},
};

const NOT_FOUND: &str = "Group not found";

fn dedup(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut out = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

async fn load(repo: &dyn Repository, id: Uuid) -> Result<Group, ApiError> {
    repo.get_group(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

/// Resolves member ids to `{id, name, email}`, dropping ids with no user record.
async fn populate(
    repo: &dyn Repository,
    group: Group,
    cache: &mut HashMap<Uuid, Option<UserSummary>>,
) -> Result<GroupDetail, ApiError> {
    let mut members = Vec::with_capacity(group.members.len());
    for member_id in &group.members {
        if !cache.contains_key(member_id) {
            let summary = repo.get_user(*member_id).await?.map(|u| UserSummary::from(&u));
            cache.insert(*member_id, summary);
        }
        if let Some(Some(summary)) = cache.get(member_id) {
            members.push(summary.clone());
        }
    }

    Ok(GroupDetail {
        id: group.id,
        name: group.name,
        members,
        created_by: group.created_by,
        created_at: group.created_at,
    })
}

/// create_group
///
/// Group names are unique. Initial members are de-duplicated, first occurrence wins.
pub async fn create_group(
    repo: &dyn Repository,
    caller_id: Uuid,
    req: CreateGroupRequest,
) -> Result<Group, ApiError> {
    let name = required_text(req.name, "Group name is required")?;

    let now = Utc::now();
    let group = Group {
        id: Uuid::new_v4(),
        name,
        members: dedup(req.members.unwrap_or_default()),
        created_by: caller_id,
        created_at: now,
        updated_at: now,
    };

    let group = repo.create_group(group).await.map_err(|e| match e {
        RepositoryError::Duplicate(_) => ApiError::Conflict("Group already exists".to_string()),
        other => other.into(),
    })?;
    tracing::info!(group_id = %group.id, owner = %caller_id, "group created");
    Ok(group)
}

pub async fn get_group(repo: &dyn Repository, id: Uuid) -> Result<GroupDetail, ApiError> {
    let group = load(repo, id).await?;
    populate(repo, group, &mut HashMap::new()).await
}

pub async fn list_groups(repo: &dyn Repository) -> Result<Vec<GroupDetail>, ApiError> {
    let mut cache = HashMap::new();
    let mut out = Vec::new();
    for group in repo.list_groups().await? {
        out.push(populate(repo, group, &mut cache).await?);
    }
    Ok(out)
}

/// Hard delete by the owner. Ledger entries for the group go with it.
pub async fn delete_group(repo: &dyn Repository, id: Uuid, caller_id: Uuid) -> Result<(), ApiError> {
    let group = load(repo, id).await?;
    authorize_owner(&group, caller_id, "delete this group")?;

    if !repo.delete_group(id).await? {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    tracing::info!(group_id = %id, "group deleted");
    Ok(())
}

/// Adds a member. Adding an existing member is a no-op.
pub async fn add_member(
    repo: &dyn Repository,
    id: Uuid,
    user_id: Uuid,
    caller_id: Uuid,
) -> Result<Group, ApiError> {
    let mut group = load(repo, id).await?;
    authorize_owner(&group, caller_id, "modify this group")?;

    if repo.get_user(user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    if group.members.contains(&user_id) {
        return Ok(group);
    }

    group.members.push(user_id);
    group.updated_at = Utc::now();
    repo.save_group(group)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

pub async fn remove_member(
    repo: &dyn Repository,
    id: Uuid,
    user_id: Uuid,
    caller_id: Uuid,
) -> Result<Group, ApiError> {
    let mut group = load(repo, id).await?;
    authorize_owner(&group, caller_id, "modify this group")?;

    group.members.retain(|member| *member != user_id);
    group.updated_at = Utc::now();
    repo.save_group(group)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}
