use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Assignment, Course, Group, User};

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// RepositoryError
///
/// Storage-level failure. `Duplicate` is raised by unique indexes (user email, group name,
/// course/group ledger pair) and carries the violated key.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("duplicate key violates {0}")]
    Duplicate(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Repository Trait
///
/// Document-style persistence contract: create, read, replace and delete records by
/// identifier plus the handful of lookups the services need. Business rules (ownership,
/// soft-delete visibility for single reads, deduplication) live in `services`.
///
/// `Send + Sync + async_trait` make `Arc<dyn Repository>` usable across Axum tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(&self, user: User) -> RepoResult<User>;
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>>;
    // Active users only.
    async fn list_users(&self) -> RepoResult<Vec<User>>;
    // Full replace keyed by `user.id`. `None` when the user does not exist.
    async fn save_user(&self, user: User) -> RepoResult<Option<User>>;

    // --- Courses ---
    async fn create_course(&self, course: Course) -> RepoResult<Course>;
    // Raw lookup, soft-deleted rows included.
    async fn get_course(&self, id: Uuid) -> RepoResult<Option<Course>>;
    // Raw batch lookup, soft-deleted rows included. Missing ids are skipped.
    async fn get_courses(&self, ids: &[Uuid]) -> RepoResult<Vec<Course>>;
    // Non-deleted courses, newest first.
    async fn list_courses(&self) -> RepoResult<Vec<Course>>;
    async fn save_course(&self, course: Course) -> RepoResult<Option<Course>>;

    // --- Groups ---
    async fn create_group(&self, group: Group) -> RepoResult<Group>;
    async fn get_group(&self, id: Uuid) -> RepoResult<Option<Group>>;
    async fn list_groups(&self) -> RepoResult<Vec<Group>>;
    async fn save_group(&self, group: Group) -> RepoResult<Option<Group>>;
    // Hard delete. Ledger entries of the group go with it. Returns false when absent.
    async fn delete_group(&self, id: Uuid) -> RepoResult<bool>;
    async fn groups_with_member(&self, user_id: Uuid) -> RepoResult<Vec<Group>>;

    // --- Assignment ledger ---
    async fn find_assignment(&self, course_id: Uuid, group_id: Uuid)
    -> RepoResult<Option<Assignment>>;
    // Fails with `Duplicate` when the (course, group) pair already exists.
    async fn create_assignment(&self, assignment: Assignment) -> RepoResult<Assignment>;
    // Entries for any of the groups, most recent first.
    async fn assignments_for_groups(&self, group_ids: &[Uuid]) -> RepoResult<Vec<Assignment>>;
}

/// RepositoryState
///
/// The shared handle stored in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;
