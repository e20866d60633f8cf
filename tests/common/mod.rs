#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{http::header, test, web, App};
use serde_json::{json, Value};
use taskkeeper::auth::{AuthMiddleware, CredentialStore, TokenService};
use taskkeeper::models::Task;
use taskkeeper::routes::{self, health};
use taskkeeper::TaskService;

pub const JWT_SECRET: &str = "integration_test_secret";

/// A service on a fresh in-memory store with a fast bcrypt cost.
pub fn test_service() -> web::Data<TaskService> {
    web::Data::new(TaskService::in_memory(
        TokenService::with_default_ttl(JWT_SECRET),
        CredentialStore::new(4),
    ))
}

/// The application exactly as `main` assembles it, minus CORS.
pub async fn init_app(
    service: web::Data<TaskService>,
) -> impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .app_data(service)
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            ),
    )
    .await
}

pub async fn register(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
    password: &str,
) -> Value {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": username, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    test::read_body_json(resp).await
}

pub async fn login(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
    password: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/api/auth/token")
        .set_form([("username", username), ("password", password)])
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    body["access_token"]
        .as_str()
        .expect("access_token should be a string")
        .to_string()
}

/// Registers and logs in, returning `(user_id, token)`.
pub async fn sign_up(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    username: &str,
    password: &str,
) -> (i64, String) {
    let user = register(app, username, password).await;
    let token = login(app, username, password).await;
    (user["id"].as_i64().expect("id should be a number"), token)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

pub async fn create_task(
    app: &impl Service<actix_http::Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    token: &str,
    payload: Value,
) -> Task {
    let req = test::TestRequest::post()
        .uri("/api/task")
        .append_header(bearer(token))
        .set_json(payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
    test::read_body_json(resp).await
}
