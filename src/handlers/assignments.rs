use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiJson},
    models::{AssignedCourse, AssignmentMessage, CreateAssignmentRequest},
    services::assignments,
};

/// assign_course
///
/// [Admin Route] Adds a ledger entry for the (course, group) pair.
#[utoipa::path(
    post,
    path = "/assignments/assign",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assigned", body = AssignmentMessage),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Course or group not found"),
        (status = 409, description = "Already assigned")
    )
)]
pub async fn assign_course(
    user: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateAssignmentRequest>,
) -> Result<(StatusCode, Json<AssignmentMessage>), ApiError> {
    let assignment = assignments::assign(state.repo.as_ref(), &user, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AssignmentMessage {
            message: "Course assigned successfully".to_string(),
            assignment,
        }),
    ))
}

/// get_my_courses
///
/// [Authenticated Route] Courses reaching the caller through group membership.
#[utoipa::path(
    get,
    path = "/assignments/mine",
    responses((status = 200, description = "Assigned courses", body = [AssignedCourse]))
)]
pub async fn get_my_courses(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignedCourse>>, ApiError> {
    let courses = assignments::list_assigned_courses_for_user(state.repo.as_ref(), id).await?;
    Ok(Json(courses))
}
