use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Unauthenticated endpoints: health, account signup/login and the course catalogue.
/// Catalogue reads never return soft-deleted courses.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /signup, POST /login
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        // GET /course/all
        // Every live course, newest first.
        .route("/course/all", get(handlers::courses::get_all_courses))
        // GET /course/{id}
        .route("/course/{id}", get(handlers::courses::get_course))
}
