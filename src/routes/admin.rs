use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Admin Router Module
///
/// Endpoints for callers whose token carries `role = admin`. `create_router` layers
/// `require_role(Role::Admin)` inside `require_auth` on this router. Group mutations
/// are further restricted to the group's owner.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /course/assigned
        // Adds groups to a course's assigned set.
        .route(
            "/course/assigned",
            post(handlers::courses::assign_course_to_groups),
        )
        // --- Groups ---
        .route("/group/create", post(handlers::groups::create_group))
        .route("/group/all", get(handlers::groups::get_all_groups))
        .route("/group/{group_id}", get(handlers::groups::get_group))
        .route(
            "/group/delete/{group_id}",
            delete(handlers::groups::delete_group),
        )
        .route(
            "/group/{group_id}/members",
            post(handlers::groups::add_member),
        )
        .route(
            "/group/delete/{group_id}/{user_id}",
            delete(handlers::groups::remove_member),
        )
        // --- User administration ---
        .route("/admin/users", get(handlers::users::list_users))
        .route(
            "/admin/users/{user_id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::deactivate_user),
        )
}
