//! Postgres-backed repositories.
//!
//! The `uq_user_name` and `uq_task_title` constraints are the source of truth for uniqueness,
//! and `tasks.owner_id ... ON DELETE CASCADE` removes a user's tasks with the user
//! (see `migrations/`).

use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    task_not_found, user_not_found, RepositoryError, TaskRepository, UserRepository,
    TITLE_TAKEN, USERNAME_TAKEN,
};
use crate::models::{Task, TaskInput, TaskUpdate, User};

const TASK_COLUMNS: &str =
    "id, title, description, status, created_at, updated_at, deadline, owner_id";

/// Maps constraint violations on write to their repository meaning.
fn map_write_error(error: sqlx::Error, conflict: &str) -> RepositoryError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return RepositoryError::Conflict(conflict.to_string());
        }
        if db_error.is_foreign_key_violation() {
            return user_not_found();
        }
    }
    RepositoryError::Database(error)
}

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, username: &str, password_digest: &str) -> Result<User, RepositoryError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_digest) VALUES ($1, $2)
             RETURNING id, username, password_digest",
        )
        .bind(username)
        .bind(password_digest)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, USERNAME_TAKEN))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_digest FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_digest FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: TaskInput, owner_id: i32) -> Result<Task, RepositoryError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, status, deadline, owner_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {TASK_COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&sql)
            .bind(task.title)
            .bind(task.description)
            .bind(task.status)
            .bind(task.deadline)
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, TITLE_TAKEN))
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Task>, RepositoryError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Task>, RepositoryError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE title = $1");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(title)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn list_by_owner(&self, owner_id: i32) -> Result<Vec<Task>, RepositoryError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1 ORDER BY id");
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn update(&self, id: i32, update: TaskUpdate) -> Result<Task, RepositoryError> {
        // Each variant is a single UPDATE statement, so no partial write is ever visible.
        let result = match update {
            TaskUpdate::Replace(input) => {
                let sql = format!(
                    "UPDATE tasks
                     SET title = $1, description = $2, status = $3, deadline = $4, updated_at = NOW()
                     WHERE id = $5
                     RETURNING {TASK_COLUMNS}"
                );
                sqlx::query_as::<_, Task>(&sql)
                    .bind(input.title)
                    .bind(input.description)
                    .bind(input.status)
                    .bind(input.deadline)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            }
            TaskUpdate::Status(status) => {
                let sql = format!(
                    "UPDATE tasks SET status = $1, updated_at = NOW()
                     WHERE id = $2
                     RETURNING {TASK_COLUMNS}"
                );
                sqlx::query_as::<_, Task>(&sql)
                    .bind(status)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            }
            TaskUpdate::Deadline(deadline) => {
                let sql = format!(
                    "UPDATE tasks SET deadline = $1, updated_at = NOW()
                     WHERE id = $2
                     RETURNING {TASK_COLUMNS}"
                );
                sqlx::query_as::<_, Task>(&sql)
                    .bind(deadline)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
            }
        };

        result
            .map_err(|e| map_write_error(e, TITLE_TAKEN))?
            .ok_or_else(task_not_found)
    }

    async fn delete(&self, id: i32) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(task_not_found());
        }
        Ok(())
    }
}
