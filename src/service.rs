//! Authorization-gated task operations.
//!
//! `TaskService` composes the credential store, token service and both repositories. Every
//! single-task operation looks the task up first and then applies the ownership gate: a task
//! that exists but belongs to someone else yields `Forbidden`, never its data.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::{CredentialStore, TokenService};
use crate::error::{AppError, AuthError};
use crate::models::{Task, TaskInput, TaskKey, TaskUpdate, User};
use crate::repository::{MemoryStore, TaskRepository, UserRepository};

#[derive(Clone)]
pub struct TaskService {
    users: Arc<dyn UserRepository>,
    tasks: Arc<dyn TaskRepository>,
    tokens: TokenService,
    credentials: CredentialStore,
}

impl TaskService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        tokens: TokenService,
        credentials: CredentialStore,
    ) -> Self {
        Self {
            users,
            tasks,
            tokens,
            credentials,
        }
    }

    /// A service backed by a fresh [`MemoryStore`].
    pub fn in_memory(tokens: TokenService, credentials: CredentialStore) -> Self {
        let store = MemoryStore::new();
        Self::new(
            Arc::new(store.clone()),
            Arc::new(store),
            tokens,
            credentials,
        )
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn users(&self) -> &dyn UserRepository {
        self.users.as_ref()
    }

    /// Creates an account. The username check here is only a fast path; the repository
    /// rejects a concurrent duplicate as well.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("Username already registered".into()));
        }

        let digest = self.credentials.hash(password)?;
        let user = self.users.create(username, &digest).await?;
        log::info!("registered user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Exchanges credentials for a bearer token.
    ///
    /// An unknown username and a wrong password fail identically.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) if self.credentials.verify(password, &user.password_digest) => user,
            _ => {
                log::debug!("failed login attempt for {:?}", username);
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let token = self.tokens.issue(user.id)?;
        log::info!("user {} logged in", user.id);
        Ok(token)
    }

    /// Deletes the caller's account together with all of its tasks.
    pub async fn delete_account(&self, caller: &User) -> Result<(), AppError> {
        self.users.delete(caller.id).await?;
        log::info!("deleted user {} and their tasks", caller.id);
        Ok(())
    }

    pub async fn list_tasks(&self, caller: &User) -> Result<Vec<Task>, AppError> {
        Ok(self.tasks.list_by_owner(caller.id).await?)
    }

    pub async fn get_task(&self, key: &TaskKey, caller: &User) -> Result<Task, AppError> {
        self.owned_task(key, caller).await
    }

    /// Creates a task owned by the caller, whatever owner the input may have named.
    pub async fn create_task(&self, fields: TaskInput, caller: &User) -> Result<Task, AppError> {
        if self.tasks.find_by_title(&fields.title).await?.is_some() {
            return Err(AppError::Conflict(
                "Task with this title already exists".into(),
            ));
        }

        let task = self.tasks.create(fields, caller.id).await?;
        log::info!("user {} created task {}", caller.id, task.id);
        Ok(task)
    }

    /// Replaces title, description, status and deadline of an owned task.
    pub async fn update_task(
        &self,
        key: &TaskKey,
        fields: TaskInput,
        caller: &User,
    ) -> Result<Task, AppError> {
        self.apply(key, TaskUpdate::Replace(fields), caller).await
    }

    pub async fn update_status(
        &self,
        key: &TaskKey,
        status: bool,
        caller: &User,
    ) -> Result<Task, AppError> {
        self.apply(key, TaskUpdate::Status(status), caller).await
    }

    pub async fn update_deadline(
        &self,
        key: &TaskKey,
        deadline: DateTime<Utc>,
        caller: &User,
    ) -> Result<Task, AppError> {
        self.apply(key, TaskUpdate::Deadline(deadline), caller).await
    }

    pub async fn delete_task(&self, key: &TaskKey, caller: &User) -> Result<(), AppError> {
        let task = self.owned_task(key, caller).await?;
        self.tasks.delete(task.id).await?;
        log::info!("user {} deleted task {}", caller.id, task.id);
        Ok(())
    }

    async fn apply(
        &self,
        key: &TaskKey,
        update: TaskUpdate,
        caller: &User,
    ) -> Result<Task, AppError> {
        let task = self.owned_task(key, caller).await?;
        let updated = self.tasks.update(task.id, update).await?;
        log::info!("user {} updated task {}", caller.id, updated.id);
        Ok(updated)
    }

    /// Looks the task up and applies the ownership gate.
    async fn owned_task(&self, key: &TaskKey, caller: &User) -> Result<Task, AppError> {
        let task = match key {
            TaskKey::Id(id) => self.tasks.find_by_id(*id).await?,
            TaskKey::Title(title) => self.tasks.find_by_title(title).await?,
        }
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

        if task.owner_id != caller.id {
            log::warn!(
                "user {} denied access to task {} owned by {}",
                caller.id,
                task.id,
                task.owner_id
            );
            return Err(AppError::Forbidden(
                "You are not authorized to access this task".into(),
            ));
        }
        Ok(task)
    }
}
