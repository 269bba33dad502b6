mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{TestApp, body_bytes, body_json, empty_request, json_request};
use lms_backend::{
    MockMediaStore,
    models::{PresignedUrlResponse, Role},
    services::courses,
};
use serde_json::json;
use uuid::Uuid;

const VIDEO_KEY: &str = "courses/lecture.mp4";

fn video_bytes() -> Vec<u8> {
    (0..1000u32).map(|i| (i % 251) as u8).collect()
}

fn app_with_video() -> TestApp {
    TestApp::with_media(MockMediaStore::new().with_object(VIDEO_KEY, video_bytes(), Some("video/mp4")))
}

fn video_request(course_id: Uuid, token: &str, range: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("GET")
        .uri(format!("/course/video/{course_id}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    if let Some(range) = range {
        builder = builder.header(header::RANGE, range);
    }
    builder.body(Body::empty()).unwrap()
}

fn header_str<'a>(response: &'a axum::response::Response, name: header::HeaderName) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

// --- Range serving ---

#[tokio::test]
async fn first_500_bytes_are_served_as_206() {
    let app = app_with_video();
    let user = app.seed_user("Viewer", Role::User).await;
    let course = app.seed_course(user.id, VIDEO_KEY).await;

    let response = app
        .send(video_request(course.id, &app.token_for(&user), Some("bytes=0-499")))
        .await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 0-499/1000");
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "500");
    assert_eq!(header_str(&response, header::ACCEPT_RANGES), "bytes");
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "video/mp4");

    let body = body_bytes(response).await;
    assert_eq!(body, video_bytes()[0..500].to_vec());
}

#[tokio::test]
async fn no_range_serves_whole_file_as_200() {
    let app = app_with_video();
    let user = app.seed_user("Viewer", Role::User).await;
    let course = app.seed_course(user.id, VIDEO_KEY).await;

    let response = app.send(video_request(course.id, &app.token_for(&user), None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "1000");
    assert_eq!(header_str(&response, header::ACCEPT_RANGES), "bytes");
    assert!(response.headers().get(header::CONTENT_RANGE).is_none());
    assert_eq!(body_bytes(response).await, video_bytes());
}

#[tokio::test]
async fn open_ended_and_suffix_ranges() {
    let app = app_with_video();
    let user = app.seed_user("Viewer", Role::User).await;
    let course = app.seed_course(user.id, VIDEO_KEY).await;
    let token = app.token_for(&user);

    let response = app.send(video_request(course.id, &token, Some("bytes=900-"))).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 900-999/1000");
    assert_eq!(body_bytes(response).await, video_bytes()[900..].to_vec());

    let response = app.send(video_request(course.id, &token, Some("bytes=-10"))).await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 990-999/1000");
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "10");
}

#[tokio::test]
async fn end_past_size_is_clamped() {
    let app = app_with_video();
    let user = app.seed_user("Viewer", Role::User).await;
    let course = app.seed_course(user.id, VIDEO_KEY).await;

    let response = app
        .send(video_request(course.id, &app.token_for(&user), Some("bytes=500-99999")))
        .await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes 500-999/1000");
    assert_eq!(body_bytes(response).await.len(), 500);
}

#[tokio::test]
async fn start_past_end_of_file_is_416() {
    let app = app_with_video();
    let user = app.seed_user("Viewer", Role::User).await;
    let course = app.seed_course(user.id, VIDEO_KEY).await;

    let response = app
        .send(video_request(course.id, &app.token_for(&user), Some("bytes=1000-1100")))
        .await;
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes */1000");
}

#[tokio::test]
async fn multi_range_header_falls_back_to_full_body() {
    let app = app_with_video();
    let user = app.seed_user("Viewer", Role::User).await;
    let course = app.seed_course(user.id, VIDEO_KEY).await;

    let response = app
        .send(video_request(course.id, &app.token_for(&user), Some("bytes=0-1,5-6")))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "1000");
}

#[tokio::test]
async fn content_type_is_guessed_when_store_has_none() {
    let app = TestApp::with_media(MockMediaStore::new().with_object(
        "courses/clip.webm",
        vec![0u8; 64],
        None,
    ));
    let user = app.seed_user("Viewer", Role::User).await;
    let course = app.seed_course(user.id, "courses/clip.webm").await;

    let response = app.send(video_request(course.id, &app.token_for(&user), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "video/webm");
}

#[tokio::test]
async fn empty_object_serves_empty_body_or_416() {
    let app = TestApp::with_media(MockMediaStore::new().with_object(VIDEO_KEY, Vec::<u8>::new(), None));
    let user = app.seed_user("Viewer", Role::User).await;
    let course = app.seed_course(user.id, VIDEO_KEY).await;
    let token = app.token_for(&user);

    let response = app.send(video_request(course.id, &token, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "0");
    assert!(body_bytes(response).await.is_empty());

    let response = app.send(video_request(course.id, &token, Some("bytes=0-"))).await;
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(header_str(&response, header::CONTENT_RANGE), "bytes */0");
}

// --- Lookup failures ---

#[tokio::test]
async fn deleted_course_video_is_404() {
    let app = app_with_video();
    let user = app.seed_user("Viewer", Role::User).await;
    let course = app.seed_course(user.id, VIDEO_KEY).await;
    courses::delete_course(app.repo.as_ref(), course.id, user.id)
        .await
        .unwrap();

    let response = app.send(video_request(course.id, &app.token_for(&user), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_course_and_missing_object_are_404() {
    let app = app_with_video();
    let user = app.seed_user("Viewer", Role::User).await;
    let token = app.token_for(&user);

    let response = app.send(video_request(Uuid::new_v4(), &token, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let orphan = app.seed_course(user.id, "courses/never-uploaded.mp4").await;
    let response = app.send(video_request(orphan.id, &token, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Video not found");
}

#[tokio::test]
async fn video_requires_token() {
    let app = app_with_video();
    let user = app.seed_user("Viewer", Role::User).await;
    let course = app.seed_course(user.id, VIDEO_KEY).await;

    let response = app
        .send(empty_request("GET", &format!("/course/video/{}", course.id), None))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn storage_failure_is_500_with_generic_message() {
    let app = TestApp::with_media(MockMediaStore::new_failing());
    let user = app.seed_user("Viewer", Role::User).await;
    let course = app.seed_course(user.id, VIDEO_KEY).await;

    let response = app.send(video_request(course.id, &app.token_for(&user), None)).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["message"], "Internal server error");
}

// --- Presigned upload ---

#[tokio::test]
async fn presigned_url_success() {
    let app = TestApp::new();
    let user = app.seed_user("Uploader", Role::Instructor).await;

    let response = app
        .send(json_request(
            "POST",
            "/upload/presigned",
            Some(&app.token_for(&user)),
            json!({ "filename": "lecture_01.mp4", "fileType": "video/mp4" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: PresignedUrlResponse =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body.upload_url.contains("signature=fake"));
    assert!(body.resource_key.starts_with("courses/"));
    assert!(body.resource_key.ends_with(".mp4"));
}

#[tokio::test]
async fn presigned_url_key_ignores_path_in_filename() {
    let app = TestApp::new();
    let user = app.seed_user("Uploader", Role::Instructor).await;

    let response = app
        .send(json_request(
            "POST",
            "/upload/presigned",
            Some(&app.token_for(&user)),
            json!({ "filename": "../../etc/passwd.exe", "fileType": "application/octet-stream" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: PresignedUrlResponse =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body.resource_key.ends_with(".exe"));
    assert!(!body.resource_key.contains(".."));
    assert!(!body.resource_key.contains("etc"));
}

#[tokio::test]
async fn presigned_url_storage_failure() {
    let app = TestApp::with_media(MockMediaStore::new_failing());
    let user = app.seed_user("Uploader", Role::Instructor).await;

    let response = app
        .send(json_request(
            "POST",
            "/upload/presigned",
            Some(&app.token_for(&user)),
            json!({ "filename": "valid.mp4", "fileType": "video/mp4" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn presigned_url_requires_token() {
    let app = TestApp::new();
    let response = app
        .send(json_request(
            "POST",
            "/upload/presigned",
            None,
            json!({ "filename": "valid.mp4", "fileType": "video/mp4" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
