use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiJson},
    models::{LoginRequest, LoginResponse, SignupRequest, User, UserMessage},
    services::accounts,
};

/// signup
///
/// [Public Route] Creates an account. Role defaults to `user`.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Registered", body = UserMessage),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<(StatusCode, Json<UserMessage>), ApiError> {
    let user = accounts::signup(state.repo.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(UserMessage {
            message: "User registered successfully".to_string(),
            user,
        }),
    ))
}

/// login
///
/// [Public Route] Exchanges email and password for a 10 hour access token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User not found or inactive")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let response = accounts::login(state.repo.as_ref(), &state.config.jwt_secret, payload).await?;
    Ok(Json(response))
}

/// get_me
///
/// [Authenticated Route] The caller's stored profile.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = User))
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(accounts::me(state.repo.as_ref(), id).await?))
}
