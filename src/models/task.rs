use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;

/// Input structure for creating or replacing a task.
///
/// Has no owner field. The owner is always the authenticated caller,
/// and an `owner_id` key in the request body is ignored during deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task. Unique across all tasks.
    /// Must be between 1 and 50 characters.
    #[validate(length(min = 1, max = 50))]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 255 characters if provided.
    #[validate(length(max = 255))]
    pub description: Option<String>,

    /// Whether the task is done. Defaults to `false`.
    #[serde(default)]
    pub status: bool,

    /// Optional deadline for the task.
    pub deadline: Option<DateTime<Utc>>,
}

/// Body of a status-only update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: bool,
}

/// Body of a deadline-only update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineUpdate {
    pub deadline: DateTime<Utc>,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    /// `true` once the task is done.
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    /// Identifier of the user who owns the task.
    pub owner_id: i32,
}

/// A single atomic change applied to a stored task.
#[derive(Debug, Clone)]
pub enum TaskUpdate {
    /// Replace title, description, status and deadline.
    Replace(TaskInput),
    Status(bool),
    Deadline(DateTime<Utc>),
}

impl TaskUpdate {
    /// Applies the change in place and bumps `updated_at`.
    pub fn apply(self, task: &mut Task, now: DateTime<Utc>) {
        match self {
            TaskUpdate::Replace(input) => {
                task.title = input.title;
                task.description = input.description;
                task.status = input.status;
                task.deadline = input.deadline;
            }
            TaskUpdate::Status(status) => task.status = status,
            TaskUpdate::Deadline(deadline) => task.deadline = Some(deadline),
        }
        task.updated_at = now;
    }
}

/// Query parameters that identify a single task by id or by title.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TaskLookup {
    pub id: Option<i32>,
    pub title: Option<String>,
}

/// The resolved form of a [`TaskLookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKey {
    Id(i32),
    Title(String),
}

impl TaskLookup {
    /// Picks the lookup key. The id wins when both are supplied.
    pub fn key(self) -> Result<TaskKey, AppError> {
        match (self.id, self.title) {
            (Some(id), _) => Ok(TaskKey::Id(id)),
            (None, Some(title)) if !title.is_empty() => Ok(TaskKey::Title(title)),
            _ => Err(AppError::BadRequest(
                "Please provide either task ID or title".into(),
            )),
        }
    }
}
