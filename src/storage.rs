use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3 as s3;
use bytes::Bytes;
use futures::stream::{self, BoxStream};
use s3::presigning::PresigningConfig;
use thiserror::Error;

use crate::range::ByteSpan;

/// Body stream handed to Axum. Dropping it (client disconnect) releases the object handle.
pub type MediaStream = BoxStream<'static, Result<Bytes, io::Error>>;

/// Metadata of a stored media object.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaObject {
    pub size: u64,
    pub content_type: Option<String>,
}

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("object storage request failed: {0}")]
    Backend(String),

    #[error("could not presign upload: {0}")]
    Presign(String),
}

/// MediaStore
///
/// Contract for the object storage that holds course videos, addressed by the course's
/// media locator (object key). Swapped between `S3MediaStore` and `MockMediaStore`
/// without touching handlers.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Creates the bucket if missing. Only called for `Env::Local` (MinIO).
    async fn ensure_bucket_exists(&self);

    /// Size and content type of the object, `None` when nothing exists at `key`.
    async fn stat(&self, key: &str) -> Result<Option<MediaObject>, MediaError>;

    /// Streams the inclusive byte span of the object.
    async fn read_range(&self, key: &str, span: ByteSpan) -> Result<MediaStream, MediaError>;

    /// Short-lived URL a client can PUT the video to directly.
    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, MediaError>;
}

/// S3MediaStore
///
/// AWS SDK client for any S3-compatible endpoint (MinIO locally). Path-style addressing
/// is forced because MinIO and most gateways require it.
#[derive(Clone)]
pub struct S3MediaStore {
    client: s3::Client,
    bucket_name: String,
}

impl S3MediaStore {
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            bucket_name: bucket.to_string(),
        }
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn ensure_bucket_exists(&self) {
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            // Already-owned buckets also land here.
            tracing::debug!("create_bucket({}) returned: {}", self.bucket_name, e);
        }
    }

    async fn stat(&self, key: &str) -> Result<Option<MediaObject>, MediaError> {
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await;

        match result {
            Ok(head) => Ok(Some(MediaObject {
                size: head.content_length().unwrap_or(0).max(0) as u64,
                content_type: head.content_type().map(str::to_string),
            })),
            Err(e) => match e.as_service_error() {
                Some(service_err) if service_err.is_not_found() => Ok(None),
                _ => Err(MediaError::Backend(e.to_string())),
            },
        }
    }

    async fn read_range(&self, key: &str, span: ByteSpan) -> Result<MediaStream, MediaError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .range(span.to_header_value())
            .send()
            .await
            .map_err(|e| MediaError::Backend(e.to_string()))?;

        let body = stream::try_unfold(output.body, |mut body| async move {
            match body.try_next().await {
                Ok(Some(chunk)) => Ok(Some((chunk, body))),
                Ok(None) => Ok(None),
                Err(e) => Err(io::Error::other(e)),
            }
        });
        Ok(Box::pin(body))
    }

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, MediaError> {
        let expires_in = Duration::from_secs(600);
        let presigning =
            PresigningConfig::expires_in(expires_in).map_err(|e| MediaError::Presign(e.to_string()))?;

        let presigned_req = self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            // The client's PUT must carry this exact Content-Type.
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| MediaError::Presign(e.to_string()))?;

        Ok(presigned_req.uri().to_string())
    }
}

/// sanitize_key
///
/// Drops empty, `.` and `..` segments from a user-influenced object key.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Clone)]
struct MockObject {
    bytes: Bytes,
    content_type: Option<String>,
}

/// MockMediaStore
///
/// In-memory `MediaStore` for tests. Objects are served in small chunks so range
/// responses exercise multi-chunk bodies.
#[derive(Clone, Default)]
pub struct MockMediaStore {
    /// When true, every operation fails with a backend error.
    pub should_fail: bool,
    objects: HashMap<String, MockObject>,
}

const MOCK_CHUNK: usize = 256;

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn with_object(
        mut self,
        key: &str,
        bytes: impl Into<Bytes>,
        content_type: Option<&str>,
    ) -> Self {
        self.objects.insert(
            key.to_string(),
            MockObject {
                bytes: bytes.into(),
                content_type: content_type.map(str::to_string),
            },
        );
        self
    }

    fn check(&self) -> Result<(), MediaError> {
        if self.should_fail {
            return Err(MediaError::Backend("mock storage failure requested".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn ensure_bucket_exists(&self) {}

    async fn stat(&self, key: &str) -> Result<Option<MediaObject>, MediaError> {
        self.check()?;
        Ok(self.objects.get(key).map(|object| MediaObject {
            size: object.bytes.len() as u64,
            content_type: object.content_type.clone(),
        }))
    }

    async fn read_range(&self, key: &str, span: ByteSpan) -> Result<MediaStream, MediaError> {
        self.check()?;
        let object = self
            .objects
            .get(key)
            .ok_or_else(|| MediaError::Backend(format!("no such key: {key}")))?;

        let end = (span.end as usize + 1).min(object.bytes.len());
        let start = (span.start as usize).min(end);
        let slice = object.bytes.slice(start..end);

        let chunks: Vec<Result<Bytes, io::Error>> = (0..slice.len())
            .step_by(MOCK_CHUNK)
            .map(|offset| Ok(slice.slice(offset..(offset + MOCK_CHUNK).min(slice.len()))))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }

    async fn get_presigned_upload_url(
        &self,
        key: &str,
        _content_type: &str,
    ) -> Result<String, MediaError> {
        self.check()?;
        Ok(format!(
            "http://localhost:9000/mock-bucket/{}?signature=fake",
            sanitize_key(key)
        ))
    }
}

/// MediaState
///
/// The shared handle stored in `AppState`.
pub type MediaState = Arc<dyn MediaStore>;
