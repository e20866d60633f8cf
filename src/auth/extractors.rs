use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::{AppError, AuthError};
use crate::models::User;

/// The caller resolved by `AuthMiddleware`.
///
/// Handlers on protected routes take this as an argument. If the middleware did not run,
/// extraction fails with the same 401 an unauthenticated request would get.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<User>().cloned() {
            Some(user) => ready(Ok(AuthenticatedUser(user))),
            None => ready(Err(AppError::Unauthorized(AuthError::MissingToken).into())),
        }
    }
}
