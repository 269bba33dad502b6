use axum::{
    Json,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiJson},
    models::{PresignedUrlRequest, PresignedUrlResponse},
    services::media::{self, MediaBody},
};

fn header_value(value: impl ToString) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&value.to_string())
        .map_err(|e| ApiError::Internal(format!("invalid header value: {e}")))
}

/// stream_course_video
///
/// [Authenticated Route] Streams the course video, honoring a single `Range: bytes=` span.
/// Only the requested span is read from object storage.
#[utoipa::path(
    get,
    path = "/course/video/{course_id}",
    params(
        ("course_id" = Uuid, Path, description = "Course ID"),
        ("Range" = Option<String>, Header, description = "e.g. bytes=0-1048575")
    ),
    responses(
        (status = 200, description = "Whole video"),
        (status = 206, description = "Requested byte span"),
        (status = 404, description = "Course or video not found"),
        (status = 416, description = "Range not satisfiable")
    )
)]
pub async fn stream_course_video(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());

    let body = media::open_course_video(
        state.repo.as_ref(),
        state.media.as_ref(),
        course_id,
        range,
    )
    .await?;

    let (status, content_type, length, content_range, stream) = match body {
        MediaBody::Full {
            size,
            content_type,
            stream,
        } => (StatusCode::OK, content_type, size, None, stream),
        MediaBody::Partial {
            span,
            size,
            content_type,
            stream,
        } => (
            StatusCode::PARTIAL_CONTENT,
            content_type,
            span.content_length(),
            Some(span.content_range(size)),
            stream,
        ),
    };

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, header_value(content_type)?);
    headers.insert(header::CONTENT_LENGTH, header_value(length)?);
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    if let Some(content_range) = content_range {
        headers.insert(header::CONTENT_RANGE, header_value(content_range)?);
    }
    Ok(response)
}

/// get_presigned_url
///
/// [Authenticated Route] Short-lived direct upload URL for a course video. The returned
/// `resourceKey` is the value to store as the course `videoUrl`.
#[utoipa::path(
    post,
    path = "/upload/presigned",
    request_body = PresignedUrlRequest,
    responses((status = 200, description = "URL", body = PresignedUrlResponse))
)]
pub async fn get_presigned_url(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PresignedUrlRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = media::presign_upload(state.media.as_ref(), payload).await?;
    tracing::debug!(user_id = %id, key = %response.resource_key, "issued presigned upload");
    Ok(Json(response))
}
