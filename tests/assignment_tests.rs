mod common;

use axum::http::StatusCode;
use common::{TestApp, at, body_json, empty_request, json_request};
use lms_backend::{
    ApiError,
    auth::AuthUser,
    models::{Assignment, CreateAssignmentRequest, Role},
    repository::Repository,
    services::{assignments, courses},
};
use serde_json::json;
use uuid::Uuid;

async fn ledger_entry(app: &TestApp, course_id: Uuid, group_id: Uuid, offset_secs: i64) {
    app.repo
        .create_assignment(Assignment {
            id: Uuid::new_v4(),
            course_id,
            group_id,
            assigned_at: at(offset_secs),
        })
        .await
        .unwrap();
}

// --- assign ---

#[tokio::test]
async fn assigning_the_same_pair_twice_conflicts_and_keeps_one_entry() {
    let app = TestApp::new();
    let admin = app.seed_user("Root", Role::Admin).await;
    let course = app.seed_course(admin.id, "courses/a.mp4").await;
    let group = app.seed_group("Cohort A", admin.id, vec![]).await;
    let token = app.token_for(&admin);
    let body = json!({ "courseId": course.id, "groupId": group.id });

    let first = app
        .send(json_request("POST", "/assignments/assign", Some(&token), body.clone()))
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);
    let first = body_json(first).await;
    assert_eq!(first["assignment"]["courseId"], course.id.to_string());
    assert_eq!(first["assignment"]["groupId"], group.id.to_string());

    let second = app
        .send(json_request("POST", "/assignments/assign", Some(&token), body))
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let entries = app.repo.assignments_for_groups(&[group.id]).await.unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn non_admin_assign_is_forbidden() {
    let app = TestApp::new();
    let instructor = app.seed_user("Teach", Role::Instructor).await;
    let admin = app.seed_user("Root", Role::Admin).await;
    let course = app.seed_course(instructor.id, "courses/a.mp4").await;
    let group = app.seed_group("Cohort A", admin.id, vec![]).await;

    let response = app
        .send(json_request(
            "POST",
            "/assignments/assign",
            Some(&app.token_for(&instructor)),
            json!({ "courseId": course.id, "groupId": group.id }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.repo.find_assignment(course.id, group.id).await.unwrap().is_none());
}

#[tokio::test]
async fn role_is_checked_before_input() {
    let app = TestApp::new();
    let caller = AuthUser {
        id: Uuid::new_v4(),
        role: Role::User,
    };
    let result = assignments::assign(
        app.repo.as_ref(),
        &caller,
        CreateAssignmentRequest::default(),
    )
    .await;
    assert!(matches!(result, Err(ApiError::Forbidden(_))));
}

#[tokio::test]
async fn missing_ids_are_400() {
    let app = TestApp::new();
    let admin = app.seed_user("Root", Role::Admin).await;
    let token = app.token_for(&admin);

    for body in [
        json!({ "courseId": Uuid::new_v4() }),
        json!({ "groupId": Uuid::new_v4() }),
        json!({}),
    ] {
        let response = app
            .send(json_request("POST", "/assignments/assign", Some(&token), body))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn unknown_or_deleted_references_are_404() {
    let app = TestApp::new();
    let admin = app.seed_user("Root", Role::Admin).await;
    let token = app.token_for(&admin);
    let course = app.seed_course(admin.id, "courses/a.mp4").await;
    let group = app.seed_group("Cohort A", admin.id, vec![]).await;

    let unknown_group = json!({ "courseId": course.id, "groupId": Uuid::new_v4() });
    let unknown_course = json!({ "courseId": Uuid::new_v4(), "groupId": group.id });
    for body in [unknown_group, unknown_course] {
        let response = app
            .send(json_request("POST", "/assignments/assign", Some(&token), body))
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    courses::delete_course(app.repo.as_ref(), course.id, admin.id)
        .await
        .unwrap();
    let response = app
        .send(json_request(
            "POST",
            "/assignments/assign",
            Some(&token),
            json!({ "courseId": course.id, "groupId": group.id }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// --- assigned courses for the caller ---

#[tokio::test]
async fn user_in_no_groups_gets_empty_list() {
    let app = TestApp::new();
    let user = app.seed_user("Loner", Role::User).await;

    let response = app
        .send(empty_request("GET", "/assignments/mine", Some(&app.token_for(&user))))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn courses_are_deduplicated_and_ordered_by_latest_assignment() {
    let app = TestApp::new();
    let admin = app.seed_user("Root", Role::Admin).await;
    let instructor = app.seed_user("Teach", Role::Instructor).await;
    let learner = app.seed_user("Learner", Role::User).await;

    let g1 = app.seed_group("Cohort A", admin.id, vec![learner.id]).await;
    let g2 = app.seed_group("Cohort B", admin.id, vec![learner.id]).await;
    let other = app.seed_group("Cohort C", admin.id, vec![]).await;

    let a = app.seed_course(instructor.id, "courses/a.mp4").await;
    let b = app.seed_course(instructor.id, "courses/b.mp4").await;
    let unrelated = app.seed_course(instructor.id, "courses/c.mp4").await;

    ledger_entry(&app, a.id, g1.id, -300).await;
    ledger_entry(&app, b.id, g2.id, -200).await;
    ledger_entry(&app, a.id, g2.id, -100).await;
    ledger_entry(&app, unrelated.id, other.id, -50).await;

    let listed = assignments::list_assigned_courses_for_user(app.repo.as_ref(), learner.id)
        .await
        .unwrap();

    let ids: Vec<Uuid> = listed.iter().map(|entry| entry.course.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
    assert!(listed[0].assigned_at > listed[1].assigned_at);

    let uploader = listed[0].uploaded_by.as_ref().unwrap();
    assert_eq!(uploader.id, instructor.id);
    assert_eq!(uploader.email, "teach@lms.test");
}

#[tokio::test]
async fn soft_deleted_courses_are_skipped() {
    let app = TestApp::new();
    let admin = app.seed_user("Root", Role::Admin).await;
    let learner = app.seed_user("Learner", Role::User).await;
    let group = app.seed_group("Cohort A", admin.id, vec![learner.id]).await;
    let live = app.seed_course(admin.id, "courses/live.mp4").await;
    let gone = app.seed_course(admin.id, "courses/gone.mp4").await;

    ledger_entry(&app, live.id, group.id, -20).await;
    ledger_entry(&app, gone.id, group.id, -10).await;
    courses::delete_course(app.repo.as_ref(), gone.id, admin.id)
        .await
        .unwrap();

    let response = app
        .send(empty_request("GET", "/assignments/mine", Some(&app.token_for(&learner))))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["course"]["id"], live.id.to_string());
    assert_eq!(listed[0]["uploadedBy"]["name"], "Root");
}

#[tokio::test]
async fn deleting_a_group_drops_its_ledger_entries() {
    let app = TestApp::new();
    let admin = app.seed_user("Root", Role::Admin).await;
    let learner = app.seed_user("Learner", Role::User).await;
    let group = app.seed_group("Cohort A", admin.id, vec![learner.id]).await;
    let course = app.seed_course(admin.id, "courses/a.mp4").await;
    ledger_entry(&app, course.id, group.id, 0).await;

    let response = app
        .send(empty_request(
            "DELETE",
            &format!("/group/delete/{}", group.id),
            Some(&app.token_for(&admin)),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(app.repo.find_assignment(course.id, group.id).await.unwrap().is_none());
    let listed = assignments::list_assigned_courses_for_user(app.repo.as_ref(), learner.id)
        .await
        .unwrap();
    assert!(listed.is_empty());
}
