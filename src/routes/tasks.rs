use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{DeadlineUpdate, StatusUpdate, TaskInput, TaskLookup},
    service::TaskService,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Retrieves every task owned by the authenticated user, oldest first.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Task` objects.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("/tasks")]
pub async fn get_tasks(
    service: web::Data<TaskService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = service.list_tasks(&user.0).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Retrieves a single task by `?id=` or `?title=`.
///
/// The id wins when both are given.
///
/// ## Responses:
/// - `200 OK`: The task, if the caller owns it.
/// - `400 Bad Request`: Neither `id` nor `title` was supplied.
/// - `403 Forbidden`: The task belongs to another user.
/// - `404 Not Found`: No such task.
#[get("")]
pub async fn get_task(
    service: web::Data<TaskService>,
    lookup: web::Query<TaskLookup>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let key = lookup.into_inner().key()?;
    let task = service.get_task(&key, &user.0).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Creates a new task for the authenticated user.
///
/// Any `owner_id` in the body is ignored; the owner is always the caller.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Task`.
/// - `400 Bad Request`: Malformed body, or a task with this title already exists.
/// - `422 Unprocessable Entity`: Title or description fail validation.
#[post("")]
pub async fn create_task(
    service: web::Data<TaskService>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = service.create_task(task_data.into_inner(), &user.0).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Replaces title, description, status and deadline of an owned task.
///
/// ## Responses:
/// - `200 OK`: The updated task.
/// - `400 Bad Request`: No lookup key, or the new title is taken.
/// - `403 Forbidden`: The task belongs to another user.
/// - `404 Not Found`: No such task.
/// - `422 Unprocessable Entity`: Title or description fail validation.
#[put("")]
pub async fn update_task(
    service: web::Data<TaskService>,
    lookup: web::Query<TaskLookup>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let key = lookup.into_inner().key()?;

    let task = service
        .update_task(&key, task_data.into_inner(), &user.0)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Sets only the `status` of an owned task.
#[patch("/status")]
pub async fn update_status(
    service: web::Data<TaskService>,
    lookup: web::Query<TaskLookup>,
    body: web::Json<StatusUpdate>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let key = lookup.into_inner().key()?;
    let task = service.update_status(&key, body.status, &user.0).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Sets only the `deadline` of an owned task.
#[patch("/deadline")]
pub async fn update_deadline(
    service: web::Data<TaskService>,
    lookup: web::Query<TaskLookup>,
    body: web::Json<DeadlineUpdate>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let key = lookup.into_inner().key()?;
    let task = service
        .update_deadline(&key, body.deadline, &user.0)
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes an owned task. Deletion is immediate.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `403 Forbidden`: The task belongs to another user.
/// - `404 Not Found`: No such task.
#[delete("")]
pub async fn delete_task(
    service: web::Data<TaskService>,
    lookup: web::Query<TaskLookup>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let key = lookup.into_inner().key()?;
    service.delete_task(&key, &user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}

