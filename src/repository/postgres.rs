use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepoResult, Repository, RepositoryError};
use crate::models::{Assignment, Course, Group, User};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, is_active, created_at, updated_at";
const COURSE_COLUMNS: &str = "id, title, description, duration, instructor, video_url, \
     uploaded_by, assigned_groups, is_deleted, created_at, updated_at";
const GROUP_COLUMNS: &str = "id, name, members, created_by, created_at, updated_at";
const ASSIGNMENT_COLUMNS: &str = "id, course_id, group_id, assigned_at";

/// Maps unique-index violations to `Duplicate` so callers can answer 409.
fn map_write_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique index").to_string();
            return RepositoryError::Duplicate(constraint);
        }
    }
    tracing::error!("postgres write error: {:?}", err);
    RepositoryError::Database(err)
}

fn map_read_error(err: sqlx::Error) -> RepositoryError {
    tracing::error!("postgres read error: {:?}", err);
    RepositoryError::Database(err)
}

/// PostgresRepository
///
/// `Repository` backed by PostgreSQL. Member lists and assigned groups are `UUID[]`
/// columns so each record stays a single row, document style. Schema lives in
/// `migrations/`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_user(&self, user: User) -> RepoResult<User> {
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.is_active)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE is_active = true ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn save_user(&self, user: User) -> RepoResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET name = $2, email = $3, password_hash = $4, role = $5, \
             is_active = $6, updated_at = $7 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.is_active)
            .bind(user.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn create_course(&self, course: Course) -> RepoResult<Course> {
        let sql = format!(
            "INSERT INTO courses ({COURSE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(course.id)
            .bind(&course.title)
            .bind(&course.description)
            .bind(course.duration)
            .bind(&course.instructor)
            .bind(&course.video_url)
            .bind(course.uploaded_by)
            .bind(&course.assigned_groups)
            .bind(course.is_deleted)
            .bind(course.created_at)
            .bind(course.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn get_course(&self, id: Uuid) -> RepoResult<Option<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn get_courses(&self, ids: &[Uuid]) -> RepoResult<Vec<Course>> {
        let sql = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = ANY($1)");
        sqlx::query_as::<_, Course>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn list_courses(&self) -> RepoResult<Vec<Course>> {
        let sql = format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE is_deleted = false \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Course>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn save_course(&self, course: Course) -> RepoResult<Option<Course>> {
        let sql = format!(
            "UPDATE courses SET title = $2, description = $3, duration = $4, instructor = $5, \
             video_url = $6, assigned_groups = $7, is_deleted = $8, updated_at = $9 \
             WHERE id = $1 RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&sql)
            .bind(course.id)
            .bind(&course.title)
            .bind(&course.description)
            .bind(course.duration)
            .bind(&course.instructor)
            .bind(&course.video_url)
            .bind(&course.assigned_groups)
            .bind(course.is_deleted)
            .bind(course.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn create_group(&self, group: Group) -> RepoResult<Group> {
        let sql = format!(
            "INSERT INTO learner_groups ({GROUP_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {GROUP_COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&sql)
            .bind(group.id)
            .bind(&group.name)
            .bind(&group.members)
            .bind(group.created_by)
            .bind(group.created_at)
            .bind(group.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn get_group(&self, id: Uuid) -> RepoResult<Option<Group>> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM learner_groups WHERE id = $1");
        sqlx::query_as::<_, Group>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn list_groups(&self) -> RepoResult<Vec<Group>> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM learner_groups ORDER BY created_at ASC");
        sqlx::query_as::<_, Group>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn save_group(&self, group: Group) -> RepoResult<Option<Group>> {
        let sql = format!(
            "UPDATE learner_groups SET name = $2, members = $3, updated_at = $4 \
             WHERE id = $1 RETURNING {GROUP_COLUMNS}"
        );
        sqlx::query_as::<_, Group>(&sql)
            .bind(group.id)
            .bind(&group.name)
            .bind(&group.members)
            .bind(group.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    /// Ledger rows are removed by `ON DELETE CASCADE` on `course_assignments.group_id`.
    async fn delete_group(&self, id: Uuid) -> RepoResult<bool> {
        sqlx::query("DELETE FROM learner_groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|res| res.rows_affected() > 0)
            .map_err(map_write_error)
    }

    async fn groups_with_member(&self, user_id: Uuid) -> RepoResult<Vec<Group>> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM learner_groups WHERE $1 = ANY(members)");
        sqlx::query_as::<_, Group>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_read_error)
    }

    async fn find_assignment(
        &self,
        course_id: Uuid,
        group_id: Uuid,
    ) -> RepoResult<Option<Assignment>> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM course_assignments \
             WHERE course_id = $1 AND group_id = $2"
        );
        sqlx::query_as::<_, Assignment>(&sql)
            .bind(course_id)
            .bind(group_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_read_error)
    }

    /// The `(course_id, group_id)` unique index turns a lost race into `Duplicate`.
    async fn create_assignment(&self, assignment: Assignment) -> RepoResult<Assignment> {
        let sql = format!(
            "INSERT INTO course_assignments ({ASSIGNMENT_COLUMNS}) VALUES ($1, $2, $3, $4) \
             RETURNING {ASSIGNMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Assignment>(&sql)
            .bind(assignment.id)
            .bind(assignment.course_id)
            .bind(assignment.group_id)
            .bind(assignment.assigned_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn assignments_for_groups(&self, group_ids: &[Uuid]) -> RepoResult<Vec<Assignment>> {
        let sql = format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM course_assignments \
             WHERE group_id = ANY($1) ORDER BY assigned_at DESC"
        );
        sqlx::query_as::<_, Assignment>(&sql)
            .bind(group_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(map_read_error)
    }
}
