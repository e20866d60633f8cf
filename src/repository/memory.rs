use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    task_not_found, user_not_found, RepositoryError, TaskRepository, UserRepository,
    TITLE_TAKEN, USERNAME_TAKEN,
};
use crate::models::{Task, TaskInput, TaskUpdate, User};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    tasks: BTreeMap<i32, Task>,
    next_user_id: i32,
    next_task_id: i32,
}

impl Tables {
    fn title_taken(&self, title: &str, except: Option<i32>) -> bool {
        self.tasks
            .values()
            .any(|task| task.title == title && Some(task.id) != except)
    }
}

/// Users and tasks held in process memory.
///
/// Every write takes the one table lock, which makes the uniqueness checks and the
/// user-to-task cascade atomic. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, username: &str, password_digest: &str) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|user| user.username == username) {
            return Err(RepositoryError::Conflict(USERNAME_TAKEN.to_string()));
        }

        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            username: username.to_string(),
            password_digest: password_digest.to_string(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or_else(user_not_found)?;
        tables.tasks.retain(|_, task| task.owner_id != id);
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn create(&self, task: TaskInput, owner_id: i32) -> Result<Task, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&owner_id) {
            return Err(user_not_found());
        }
        if tables.title_taken(&task.title, None) {
            return Err(RepositoryError::Conflict(TITLE_TAKEN.to_string()));
        }

        tables.next_task_id += 1;
        let now = Utc::now();
        let task = Task {
            id: tables.next_task_id,
            title: task.title,
            description: task.description,
            status: task.status,
            created_at: now,
            updated_at: now,
            deadline: task.deadline,
            owner_id,
        };
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Task>, RepositoryError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Task>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .tasks
            .values()
            .find(|task| task.title == title)
            .cloned())
    }

    async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Task>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .tasks
            .values()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i32, update: TaskUpdate) -> Result<Task, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.tasks.contains_key(&id) {
            return Err(task_not_found());
        }
        if let TaskUpdate::Replace(input) = &update {
            if tables.title_taken(&input.title, Some(id)) {
                return Err(RepositoryError::Conflict(TITLE_TAKEN.to_string()));
            }
        }

        let task = tables.tasks.get_mut(&id).ok_or_else(task_not_found)?;
        update.apply(task, Utc::now());
        Ok(task.clone())
    }

    async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        self.tables
            .write()
            .await
            .tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(task_not_found)
    }
}
