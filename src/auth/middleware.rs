use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::TokenService;
use crate::error::{AppError, AuthError};
use crate::models::User;
use crate::repository::UserRepository;
use crate::service::TaskService;

/// Paths under the protected scope that are reachable without a token.
const PUBLIC_PATHS: &[&str] = &["/api/auth/register", "/api/auth/token"];

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
///
/// Any other scheme, or an empty token, is treated as no token at all.
pub fn bearer_token(header_value: Option<&str>) -> Option<&str> {
    header_value
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Moves a request from unauthenticated to authenticated.
///
/// An absent token is rejected outright; otherwise the token is resolved to a user id and the
/// user is loaded. Task data is never consulted.
pub async fn authenticate(
    token: Option<&str>,
    tokens: &TokenService,
    users: &dyn UserRepository,
) -> Result<User, AppError> {
    let token = token.ok_or(AuthError::MissingToken)?;
    let user_id = tokens.resolve(token)?;

    users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AuthError::UserNotFound.into())
}

/// Resolves the bearer token of every non-public request and stores the caller's [`User`]
/// in the request extensions for [`super::extractors::AuthenticatedUser`].
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if PUBLIC_PATHS.contains(&req.path()) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let token = bearer_token(
                req.headers()
                    .get(header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok()),
            )
            .map(str::to_owned);

            let outcome = match req.app_data::<web::Data<TaskService>>().cloned() {
                Some(state) => authenticate(token.as_deref(), state.tokens(), state.users()).await,
                None => Err(AppError::InternalServerError(
                    "Task service is not configured".into(),
                )),
            };

            match outcome {
                Ok(user) => {
                    req.extensions_mut().insert(user);
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(err) => {
                    log::debug!("rejected request to {}: {}", req.path(), err);
                    let response = err.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
