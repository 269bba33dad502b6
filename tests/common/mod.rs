#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, header},
    response::Response,
};
use chrono::{DateTime, Utc};
use lms_backend::{
    AppConfig, AppState, MockMediaStore, create_router,
    auth::{password::hash_password, token::issue_token},
    models::{Course, Group, Role, User},
    repository::{InMemoryRepository, Repository, RepositoryState},
    storage::MediaState,
};
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse-battery";

/// Router plus direct handles on the in-memory stores, so tests can seed and inspect
/// records without going through HTTP.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<InMemoryRepository>,
    pub config: AppConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_media(MockMediaStore::new())
    }

    pub fn with_media(media: MockMediaStore) -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let config = AppConfig::default();
        let state = AppState {
            repo: repo.clone() as RepositoryState,
            media: Arc::new(media) as MediaState,
            config: config.clone(),
        };
        Self {
            router: create_router(state),
            repo,
            config,
        }
    }

    pub fn state(&self, media: MockMediaStore) -> AppState {
        AppState {
            repo: self.repo.clone() as RepositoryState,
            media: Arc::new(media) as MediaState,
            config: self.config.clone(),
        }
    }

    pub fn token_for(&self, user: &User) -> String {
        issue_token(&self.config.jwt_secret, user.id, user.role).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        use tower::util::ServiceExt;
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn seed_user(&self, name: &str, role: Role) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@lms.test", name.to_lowercase()),
            password_hash: hash_password(PASSWORD).unwrap(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.repo.create_user(user).await.unwrap()
    }

    pub async fn seed_course(&self, owner: Uuid, video_url: &str) -> Course {
        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            title: "Intro to Rust".to_string(),
            description: Some("Ownership and borrowing".to_string()),
            duration: 1.5,
            instructor: "Ferris".to_string(),
            video_url: video_url.to_string(),
            uploaded_by: owner,
            assigned_groups: vec![],
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        self.repo.create_course(course).await.unwrap()
    }

    pub async fn seed_group(&self, name: &str, owner: Uuid, members: Vec<Uuid>) -> Group {
        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            members,
            created_by: owner,
            created_at: now,
            updated_at: now,
        };
        self.repo.create_group(group).await.unwrap()
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn at(offset_secs: i64) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::seconds(offset_secs)
}
