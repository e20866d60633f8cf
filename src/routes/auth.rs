use crate::{
    auth::{LoginForm, RegisterRequest, TokenResponse},
    error::AppError,
    service::TaskService,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Creates a new account and returns it without the password digest.
///
/// ## Responses:
/// - `201 Created`: `{id, username}`.
/// - `400 Bad Request`: Malformed body, or the username is already registered.
/// - `422 Unprocessable Entity`: Username or password fail validation.
#[post("/register")]
pub async fn register(
    service: web::Data<TaskService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;

    let user = service
        .register(&register_data.username, &register_data.password)
        .await?;

    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Takes a form-encoded `username` and `password` and returns a bearer token.
///
/// ## Responses:
/// - `200 OK`: `{access_token, token_type: "bearer"}`.
/// - `401 Unauthorized`: Unknown user or wrong password; the two are not distinguished.
#[post("/token")]
pub async fn login(
    service: web::Data<TaskService>,
    login_data: web::Form<LoginForm>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let token = service
        .login(&login_data.username, &login_data.password)
        .await?;

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(token)))
}
