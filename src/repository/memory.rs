use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepoResult, Repository, RepositoryError};
use crate::models::{Assignment, Course, Group, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    courses: HashMap<Uuid, Course>,
    groups: HashMap<Uuid, Group>,
    assignments: Vec<Assignment>,
}

/// InMemoryRepository
///
/// Process-local `Repository` used by the test suite and for running the API without a
/// database. It enforces the same unique keys as the Postgres schema (user email, group
/// name, ledger pair) so conflict handling behaves identically.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(&self, user: User) -> RepoResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Duplicate("users_email_key".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().filter(|u| u.is_active).cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn save_user(&self, user: User) -> RepoResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user.id) {
            return Ok(None);
        }
        if tables
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(RepositoryError::Duplicate("users_email_key".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    async fn create_course(&self, course: Course) -> RepoResult<Course> {
        let mut tables = self.tables.write().await;
        tables.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn get_course(&self, id: Uuid) -> RepoResult<Option<Course>> {
        Ok(self.tables.read().await.courses.get(&id).cloned())
    }

    async fn get_courses(&self, ids: &[Uuid]) -> RepoResult<Vec<Course>> {
        let tables = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| tables.courses.get(id).cloned()).collect())
    }

    async fn list_courses(&self) -> RepoResult<Vec<Course>> {
        let tables = self.tables.read().await;
        let mut courses: Vec<Course> = tables
            .courses
            .values()
            .filter(|c| !c.is_deleted)
            .cloned()
            .collect();
        courses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(courses)
    }

    async fn save_course(&self, course: Course) -> RepoResult<Option<Course>> {
        let mut tables = self.tables.write().await;
        match tables.courses.get_mut(&course.id) {
            Some(stored) => {
                *stored = course.clone();
                Ok(Some(course))
            }
            None => Ok(None),
        }
    }

    async fn create_group(&self, group: Group) -> RepoResult<Group> {
        let mut tables = self.tables.write().await;
        if tables.groups.values().any(|g| g.name == group.name) {
            return Err(RepositoryError::Duplicate("learner_groups_name_key".to_string()));
        }
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn get_group(&self, id: Uuid) -> RepoResult<Option<Group>> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }

    async fn list_groups(&self) -> RepoResult<Vec<Group>> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by_key(|g| g.created_at);
        Ok(groups)
    }

    async fn save_group(&self, group: Group) -> RepoResult<Option<Group>> {
        let mut tables = self.tables.write().await;
        if !tables.groups.contains_key(&group.id) {
            return Ok(None);
        }
        if tables
            .groups
            .values()
            .any(|g| g.id != group.id && g.name == group.name)
        {
            return Err(RepositoryError::Duplicate("learner_groups_name_key".to_string()));
        }
        tables.groups.insert(group.id, group.clone());
        Ok(Some(group))
    }

    async fn delete_group(&self, id: Uuid) -> RepoResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.groups.remove(&id).is_some();
        if removed {
            tables.assignments.retain(|a| a.group_id != id);
        }
        Ok(removed)
    }

    async fn groups_with_member(&self, user_id: Uuid) -> RepoResult<Vec<Group>> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .values()
            .filter(|g| g.members.contains(&user_id))
            .cloned()
            .collect())
    }

    async fn find_assignment(
        &self,
        course_id: Uuid,
        group_id: Uuid,
    ) -> RepoResult<Option<Assignment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .iter()
            .find(|a| a.course_id == course_id && a.group_id == group_id)
            .cloned())
    }

    async fn create_assignment(&self, assignment: Assignment) -> RepoResult<Assignment> {
        let mut tables = self.tables.write().await;
        if tables
            .assignments
            .iter()
            .any(|a| a.course_id == assignment.course_id && a.group_id == assignment.group_id)
        {
            return Err(RepositoryError::Duplicate(
                "course_assignments_course_id_group_id_key".to_string(),
            ));
        }
        tables.assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn assignments_for_groups(&self, group_ids: &[Uuid]) -> RepoResult<Vec<Assignment>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<Assignment> = tables
            .assignments
            .iter()
            .filter(|a| group_ids.contains(&a.group_id))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));
        Ok(entries)
    }
}
