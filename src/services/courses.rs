use chrono::Utc;
use uuid::Uuid;

use super::{policy::authorize_owner, required_text};
use crate::{
    error::ApiError,
    models::{AssignGroupsRequest, Course, CreateCourseRequest, UpdateCourseRequest},
    repository::Repository,
};

const NOT_FOUND: &str = "Course not found";

fn valid_duration(duration: Option<f64>) -> Result<f64, ApiError> {
    match duration {
        Some(hours) if hours.is_finite() && hours > 0.0 => Ok(hours),
        _ => Err(ApiError::BadRequest(
            "Duration must be a positive number of hours".to_string(),
        )),
    }
}

/// Loads a course that is visible to reads: present and not soft-deleted.
pub async fn load_live(repo: &dyn Repository, id: Uuid) -> Result<Course, ApiError> {
    repo.get_course(id)
        .await?
        .filter(|c| !c.is_deleted)
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

/// create_course
///
/// Any authenticated user may create a course; the caller becomes its owner.
pub async fn create_course(
    repo: &dyn Repository,
    caller_id: Uuid,
    req: CreateCourseRequest,
) -> Result<Course, ApiError> {
    let title = required_text(req.title, "Title is required")?;
    let instructor = required_text(req.instructor, "Instructor is required")?;
    let video_url = required_text(req.video_url, "Video URL is required")?;
    let duration = valid_duration(req.duration)?;

    let now = Utc::now();
    let course = Course {
        id: Uuid::new_v4(),
        title,
        description: req.description,
        duration,
        instructor,
        video_url,
        uploaded_by: caller_id,
        assigned_groups: Vec::new(),
        is_deleted: false,
        created_at: now,
        updated_at: now,
    };

    let course = repo.create_course(course).await?;
    tracing::info!(course_id = %course.id, owner = %caller_id, "course created");
    Ok(course)
}

pub async fn get_course(repo: &dyn Repository, id: Uuid) -> Result<Course, ApiError> {
    load_live(repo, id).await
}

pub async fn list_courses(repo: &dyn Repository) -> Result<Vec<Course>, ApiError> {
    Ok(repo.list_courses().await?)
}

/// update_course
///
/// NotFound (absent or soft-deleted) is checked before ownership. Only content fields
/// are patchable.
pub async fn update_course(
    repo: &dyn Repository,
    id: Uuid,
    caller_id: Uuid,
    patch: UpdateCourseRequest,
) -> Result<Course, ApiError> {
    let mut course = load_live(repo, id).await?;
    authorize_owner(&course, caller_id, "update this course")?;

    if let Some(title) = patch.title {
        course.title = required_text(Some(title), "Title cannot be empty")?;
    }
    if let Some(description) = patch.description {
        course.description = Some(description);
    }
    if patch.duration.is_some() {
        course.duration = valid_duration(patch.duration)?;
    }
    if let Some(instructor) = patch.instructor {
        course.instructor = required_text(Some(instructor), "Instructor cannot be empty")?;
    }
    if let Some(video_url) = patch.video_url {
        course.video_url = required_text(Some(video_url), "Video URL cannot be empty")?;
    }
    course.updated_at = Utc::now();

    repo.save_course(course)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

/// delete_course
///
/// Soft delete by the owner. The record and its media stay in storage.
pub async fn delete_course(
    repo: &dyn Repository,
    id: Uuid,
    caller_id: Uuid,
) -> Result<(), ApiError> {
    let mut course = load_live(repo, id).await?;
    authorize_owner(&course, caller_id, "delete this course")?;

    course.is_deleted = true;
    course.updated_at = Utc::now();
    repo.save_course(course)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;
    tracing::info!(course_id = %id, "course soft-deleted");
    Ok(())
}

/// assign_groups
///
/// Appends each group id not already on the course, keeping first-insertion order.
pub async fn assign_groups(
    repo: &dyn Repository,
    req: AssignGroupsRequest,
) -> Result<Course, ApiError> {
    let (Some(course_id), Some(group_ids)) = (req.course_id, req.group_ids) else {
        return Err(ApiError::BadRequest(
            "courseId and groupIds array are required".to_string(),
        ));
    };
    if group_ids.is_empty() {
        return Err(ApiError::BadRequest(
            "courseId and groupIds array are required".to_string(),
        ));
    }

    let mut course = load_live(repo, course_id).await?;
    for group_id in group_ids {
        if !course.assigned_groups.contains(&group_id) {
            course.assigned_groups.push(group_id);
        }
    }
    course.updated_at = Utc::now();

    repo.save_course(course)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}
