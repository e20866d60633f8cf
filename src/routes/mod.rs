pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::error::AppError;

/// Registers every `/api` route. The caller wraps the enclosing scope in `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
                AppError::BadRequest(format!("Invalid JSON body: {}", err)).into()
            }),
    )
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query string: {}", err)).into()
    }))
    .app_data(web::FormConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid form body: {}", err)).into()
    }))
    .service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register),
    )
    .service(
        web::scope("/users")
            .service(users::me)
            .service(users::delete_me),
    )
    .service(tasks::get_tasks)
    .service(
        web::scope("/task")
            .service(tasks::get_task)
            .service(tasks::create_task)
            .service(tasks::update_task)
            .service(tasks::update_status)
            .service(tasks::update_deadline)
            .service(tasks::delete_task),
    );
}
