use crate::{auth::AuthenticatedUser, error::AppError, service::TaskService};
use actix_web::{delete, get, web, HttpResponse, Responder};

/// Returns the authenticated caller.
#[get("/me")]
pub async fn me(user: AuthenticatedUser) -> impl Responder {
    HttpResponse::Ok().json(user.0)
}

/// Deletes the caller's account and every task it owns.
#[delete("/me")]
pub async fn delete_me(
    service: web::Data<TaskService>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    service.delete_account(&user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}
