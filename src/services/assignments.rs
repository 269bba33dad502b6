use std::collections::{HashMap, HashSet};

use chrono::Utc;
use uuid::Uuid;

use super::courses::load_live;
use crate::{
    auth::AuthUser,
    error::ApiError,
    models::{AssignedCourse, Assignment, CreateAssignmentRequest, Role, UserSummary},
    repository::{Repository, RepositoryError},
};

const ALREADY_ASSIGNED: &str = "Course already assigned to this group";

/// assign
///
/// Records one course↔group ledger entry. Checks run in order: admin role, both ids
/// present, course live and group present, pair not yet recorded. The unique index on
/// the pair turns a lost race into the same Conflict.
pub async fn assign(
    repo: &dyn Repository,
    caller: &AuthUser,
    req: CreateAssignmentRequest,
) -> Result<Assignment, ApiError> {
    caller.require_role(Role::Admin)?;

    let (Some(course_id), Some(group_id)) = (req.course_id, req.group_id) else {
        return Err(ApiError::BadRequest(
            "courseId and groupId are required".to_string(),
        ));
    };

    load_live(repo, course_id).await?;
    if repo.get_group(group_id).await?.is_none() {
        return Err(ApiError::NotFound("Group not found".to_string()));
    }
    if repo.find_assignment(course_id, group_id).await?.is_some() {
        return Err(ApiError::Conflict(ALREADY_ASSIGNED.to_string()));
    }

    let assignment = Assignment {
        id: Uuid::new_v4(),
        course_id,
        group_id,
        assigned_at: Utc::now(),
    };

    let assignment = repo.create_assignment(assignment).await.map_err(|e| match e {
        RepositoryError::Duplicate(_) => ApiError::Conflict(ALREADY_ASSIGNED.to_string()),
        other => other.into(),
    })?;
    tracing::info!(%course_id, %group_id, "course assigned to group");
    Ok(assignment)
}

/// list_assigned_courses_for_user
///
/// Walks groups containing the user, their ledger entries and the referenced courses.
/// Each course appears once with its most recent `assigned_at`; soft-deleted courses
/// are skipped. Ordered most recent assignment first.
pub async fn list_assigned_courses_for_user(
    repo: &dyn Repository,
    user_id: Uuid,
) -> Result<Vec<AssignedCourse>, ApiError> {
    let group_ids: Vec<Uuid> = repo
        .groups_with_member(user_id)
        .await?
        .into_iter()
        .map(|g| g.id)
        .collect();
    if group_ids.is_empty() {
        return Ok(Vec::new());
    }

    // Entries arrive most recent first, so the first sighting of a course is its latest.
    let mut seen = HashSet::new();
    let latest: Vec<(Uuid, _)> = repo
        .assignments_for_groups(&group_ids)
        .await?
        .into_iter()
        .filter(|a| seen.insert(a.course_id))
        .map(|a| (a.course_id, a.assigned_at))
        .collect();
    if latest.is_empty() {
        return Ok(Vec::new());
    }

    let course_ids: Vec<Uuid> = latest.iter().map(|(id, _)| *id).collect();
    let mut courses: HashMap<Uuid, _> = repo
        .get_courses(&course_ids)
        .await?
        .into_iter()
        .filter(|c| !c.is_deleted)
        .map(|c| (c.id, c))
        .collect();

    let mut uploaders: HashMap<Uuid, Option<UserSummary>> = HashMap::new();
    let mut out = Vec::with_capacity(courses.len());
    for (course_id, assigned_at) in latest {
        let Some(course) = courses.remove(&course_id) else {
            continue;
        };
        if !uploaders.contains_key(&course.uploaded_by) {
            let summary = repo
                .get_user(course.uploaded_by)
                .await?
                .map(|u| UserSummary::from(&u));
            uploaders.insert(course.uploaded_by, summary);
        }
        let uploaded_by = uploaders.get(&course.uploaded_by).cloned().flatten();
        out.push(AssignedCourse {
            course,
            uploaded_by,
            assigned_at,
        });
    }
    Ok(out)
}
