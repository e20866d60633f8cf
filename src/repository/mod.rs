//! Persistence for users and tasks.
//!
//! Both repositories are traits so request handling receives its storage as an injected
//! dependency. [`postgres`] is the production backend; [`memory`] keeps both tables behind a
//! single lock and backs the test-suite and database-less runs.
//!
//! Uniqueness of usernames and task titles is owned by the storage layer. Callers may look a
//! record up first, but a concurrent duplicate is still rejected here as
//! [`RepositoryError::Conflict`].

use async_trait::async_trait;

use crate::models::{Task, TaskInput, TaskUpdate, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PgTaskRepository, PgUserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
}

pub const USERNAME_TAKEN: &str = "Username already registered";
pub const TITLE_TAKEN: &str = "Task with this title already exists";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user. Fails with `Conflict` if the username is taken.
    async fn create(&self, username: &str, password_digest: &str) -> Result<User, RepositoryError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    /// Removes the user and every task it owns as one operation.
    async fn delete(&self, id: i32) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a task owned by `owner_id`. Fails with `Conflict` if the title is taken and
    /// `NotFound` if the owner does not exist.
    async fn create(&self, task: TaskInput, owner_id: i32) -> Result<Task, RepositoryError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Task>, RepositoryError>;

    async fn find_by_title(&self, title: &str) -> Result<Option<Task>, RepositoryError>;

    /// Tasks owned by `owner_id`, oldest first.
    async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Task>, RepositoryError>;

    /// Applies `update` atomically. Fails with `NotFound` if the task is gone and `Conflict`
    /// if a replaced title is taken by another task.
    async fn update(&self, id: i32, update: TaskUpdate) -> Result<Task, RepositoryError>;

    async fn delete(&self, id: i32) -> Result<(), RepositoryError>;
}

pub(crate) fn task_not_found() -> RepositoryError {
    RepositoryError::NotFound("Task not found".into())
}

pub(crate) fn user_not_found() -> RepositoryError {
    RepositoryError::NotFound("User not found".into())
}
