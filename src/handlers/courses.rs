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
    models::{ApiResponse, AssignGroupsRequest, Course, CreateCourseRequest, UpdateCourseRequest},
    services::courses,
};

/// create_course
///
/// [Authenticated Route] The caller becomes the course owner.
#[utoipa::path(
    post,
    path = "/course/create",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<Course>),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_course(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateCourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Course>>), ApiError> {
    let course = courses::create_course(state.repo.as_ref(), id, payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::data(course))))
}

/// get_all_courses
///
/// [Public Route] Non-deleted courses, newest first.
#[utoipa::path(
    get,
    path = "/course/all",
    responses((status = 200, description = "Courses", body = ApiResponse<Vec<Course>>))
)]
pub async fn get_all_courses(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Course>>>, ApiError> {
    let list = courses::list_courses(state.repo.as_ref()).await?;
    Ok(Json(ApiResponse::data(list)))
}

/// get_course
///
/// [Public Route] Soft-deleted courses read as 404.
#[utoipa::path(
    get,
    path = "/course/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Found", body = ApiResponse<Course>),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Course>>, ApiError> {
    let course = courses::get_course(state.repo.as_ref(), id).await?;
    Ok(Json(ApiResponse::data(course)))
}

/// update_course
///
/// [Authenticated Route] Owner only.
#[utoipa::path(
    put,
    path = "/course/update/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<Course>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn update_course(
    AuthUser { id: caller_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ApiJson(payload): ApiJson<UpdateCourseRequest>,
) -> Result<Json<ApiResponse<Course>>, ApiError> {
    let course = courses::update_course(state.repo.as_ref(), id, caller_id, payload).await?;
    Ok(Json(ApiResponse::data(course)))
}

/// delete_course
///
/// [Authenticated Route] Owner-only soft delete.
#[utoipa::path(
    delete,
    path = "/course/delete/{id}",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn delete_course(
    AuthUser { id: caller_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    courses::delete_course(state.repo.as_ref(), id, caller_id).await?;
    Ok(Json(ApiResponse::message("Course deleted successfully")))
}

/// assign_course_to_groups
///
/// [Admin Route] Adds group ids to the course's assigned set.
#[utoipa::path(
    post,
    path = "/course/assigned",
    request_body = AssignGroupsRequest,
    responses(
        (status = 200, description = "Assigned", body = ApiResponse<Course>),
        (status = 400, description = "Missing courseId or groupIds"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn assign_course_to_groups(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AssignGroupsRequest>,
) -> Result<Json<ApiResponse<Course>>, ApiError> {
    let course = courses::assign_groups(state.repo.as_ref(), payload).await?;
    Ok(Json(ApiResponse::with_message("Course assigned to groups", course)))
}
