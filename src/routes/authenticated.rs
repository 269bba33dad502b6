use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Authenticated Router Module
///
/// Endpoints for any caller holding a valid access token, whatever the role. The router
/// is wrapped in `require_auth`, so every handler here can extract `AuthUser`.
/// Course mutations additionally check ownership in the service layer.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        .route("/me", get(handlers::auth::get_me))
        // --- Courses ---
        .route("/course/create", post(handlers::courses::create_course))
        .route("/course/update/{id}", put(handlers::courses::update_course))
        .route("/course/delete/{id}", delete(handlers::courses::delete_course))
        // GET /course/video/{course_id}
        // Range-aware video streaming (200 / 206 / 416).
        .route(
            "/course/video/{course_id}",
            get(handlers::media::stream_course_video),
        )
        // --- Assignments ---
        .route("/assignments/mine", get(handlers::assignments::get_my_courses))
        // POST /assignments/assign
        // The admin check for this one runs inside the service.
        .route("/assignments/assign", post(handlers::assignments::assign_course))
        // POST /upload/presigned
        // 10 minute direct-to-storage upload URL for course videos.
        .route("/upload/presigned", post(handlers::media::get_presigned_url))
}
