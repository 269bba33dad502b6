use std::{io, path::Path};

use bytes::Bytes;
use futures::stream;
use uuid::Uuid;

use super::courses::load_live;
use crate::{
    error::ApiError,
    models::{PresignedUrlRequest, PresignedUrlResponse},
    range::{self, ByteSpan, RangeRequest},
    repository::Repository,
    storage::{MediaStore, MediaStream, sanitize_key},
};

const FALLBACK_CONTENT_TYPE: &str = "video/mp4";

/// What to send back for a video request. The handler turns it into status and headers.
pub enum MediaBody {
    /// 200: the whole object.
    Full {
        size: u64,
        content_type: String,
        stream: MediaStream,
    },
    /// 206: one byte span.
    Partial {
        span: ByteSpan,
        size: u64,
        content_type: String,
        stream: MediaStream,
    },
}

fn content_type_for(stored: Option<String>, locator: &str) -> String {
    stored
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
        .or_else(|| mime_guess::from_path(locator).first().map(|m| m.to_string()))
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

/// open_course_video
///
/// Resolves the course, stats its object and applies the `Range` header. 404 when the
/// course is absent, soft-deleted, has no locator, or the object is missing; 416 when
/// the range cannot be satisfied.
pub async fn open_course_video(
    repo: &dyn Repository,
    media: &dyn MediaStore,
    course_id: Uuid,
    range_header: Option<&str>,
) -> Result<MediaBody, ApiError> {
    let course = load_live(repo, course_id).await?;
    let locator = course.video_url.trim();
    if locator.is_empty() {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }

    let object = media
        .stat(locator)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;
    let size = object.size;
    let content_type = content_type_for(object.content_type, locator);

    match range::resolve(range_header, size) {
        RangeRequest::Unsatisfiable => Err(ApiError::RangeNotSatisfiable { size }),
        RangeRequest::Partial(span) => {
            tracing::debug!(%course_id, start = span.start, end = span.end, size, "serving range");
            let stream = media.read_range(locator, span).await?;
            Ok(MediaBody::Partial {
                span,
                size,
                content_type,
                stream,
            })
        }
        RangeRequest::Full => {
            let stream: MediaStream = if size == 0 {
                Box::pin(stream::empty::<Result<Bytes, io::Error>>())
            } else {
                media
                    .read_range(locator, ByteSpan { start: 0, end: size - 1 })
                    .await?
            };
            Ok(MediaBody::Full {
                size,
                content_type,
                stream,
            })
        }
    }
}

/// presign_upload
///
/// Issues a 10 minute PUT URL under `courses/<uuid>.<ext>`. The returned key goes into
/// the course `videoUrl`.
pub async fn presign_upload(
    media: &dyn MediaStore,
    req: PresignedUrlRequest,
) -> Result<PresignedUrlResponse, ApiError> {
    let file_type = req.file_type.trim();
    if file_type.is_empty() {
        return Err(ApiError::BadRequest("fileType is required".to_string()));
    }

    let extension = Path::new(&req.filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("bin");
    let resource_key = sanitize_key(&format!("courses/{}.{}", Uuid::new_v4(), extension));

    let upload_url = media
        .get_presigned_upload_url(&resource_key, file_type)
        .await?;

    Ok(PresignedUrlResponse {
        upload_url,
        resource_key,
    })
}
