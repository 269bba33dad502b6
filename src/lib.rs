use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod range;
pub mod repository;
pub mod services;
pub mod storage;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// State types and backends that main.rs and the integration tests assemble.

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MediaState, MockMediaStore, S3MediaStore};

use models::Role;

/// ApiDoc
///
/// Generated OpenAPI document for every route decorated with `#[utoipa::path]`,
/// served at `/api-docs/openapi.json` and browsable at `/swagger-ui`.
/// Handlers missing from `paths` still work but stay invisible in the docs.
#[derive(OpenApi)]
#[openapi(
    // Every documented handler, grouped by resource.
    paths(
        handlers::auth::signup, handlers::auth::login, handlers::auth::get_me,
        handlers::courses::create_course, handlers::courses::get_all_courses,
        handlers::courses::get_course, handlers::courses::update_course,
        handlers::courses::delete_course, handlers::courses::assign_course_to_groups,
        handlers::assignments::assign_course, handlers::assignments::get_my_courses,
        handlers::groups::create_group, handlers::groups::get_all_groups,
        handlers::groups::get_group, handlers::groups::delete_group,
        handlers::groups::add_member, handlers::groups::remove_member,
        handlers::users::list_users, handlers::users::get_user,
        handlers::users::update_user, handlers::users::deactivate_user,
        handlers::media::stream_course_video, handlers::media::get_presigned_url,
    ),
    // Request/response bodies referenced by the paths above.
    components(
        schemas(
            models::Role, models::User, models::UserSummary, models::Course,
            models::AssignedCourse, models::Group, models::GroupDetail, models::Assignment,
            models::SignupRequest, models::LoginRequest, models::LoginResponse,
            models::UpdateUserRequest, models::CreateCourseRequest, models::UpdateCourseRequest,
            models::AssignGroupsRequest, models::CreateAssignmentRequest,
            models::CreateGroupRequest, models::AddMemberRequest,
            models::PresignedUrlRequest, models::PresignedUrlResponse,
            models::MessageBody, models::UserMessage, models::GroupMessage,
            models::AssignmentMessage,
        )
    ),
    tags(
        (name = "lms", description = "Learning management API: courses, groups, assignments and video delivery")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared state container, cloned into every request. All members are
/// cheap to clone: the backends sit behind `Arc<dyn ...>` and the config is plain data.
/// Handlers pull what they need through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for users, courses, groups and the assignment ledger.
    pub repo: RepositoryState,
    /// Object storage holding course videos.
    pub media: MediaState,
    /// Loaded once at startup; read by the auth extractor for the signing secret.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Let handlers and extractors ask for one component (`State<RepositoryState>`,
// `AppConfig: FromRef<S>`) instead of the whole `AppState`.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for MediaState {
    fn from_ref(app_state: &AppState) -> MediaState {
        app_state.media.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles public, authenticated and admin routers, applies the access gates and the
/// observability stack, and registers the state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name used for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Swagger UI plus the raw OpenAPI JSON.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: health, signup/login and the course catalogue. No gate.
        .merge(public::public_routes())
        // Authenticated Routes: token gate only. `route_layer` keeps unmatched paths
        // returning 404 instead of 401.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth::require_auth,
            )),
        )
        // Admin Routes: token gate, then role gate. The layer added last runs first,
        // so `require_auth` has stored the caller before `require_role` reads it.
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(Role::Admin, auth::require_role))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth::require_auth,
                )),
        )
        // Register the shared state for every merged router.
        .with_state(state);

    // 3. Observability and Correlation Layers (outermost, run first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID: a fresh UUID unless the client already sent one.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Tracing: one `http_request` span per request, tagged with the ID,
                // and an INFO line with status and latency when the response leaves.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Propagation: echo `x-request-id` back on the response.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS: applied last so preflight requests are answered before anything else.
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the `http_request` span for `TraceLayer`, tagged with the `x-request-id` so
/// every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    // Fields shared by every log line emitted inside the request.
    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
