//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application,
//! together with `AuthError`, the subtypes of an authentication failure.
//!
//! `AppError` implements `actix_web::error::ResponseError` so every failure reaches the client
//! as a JSON body of the form `{"error": <kind>, "detail": <message>}`. Validation failures
//! additionally carry a `fields` array with one entry per offending field.
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `bcrypt::BcryptError` and `RepositoryError` allow conversion with the `?` operator.

use actix_web::{
    error::ResponseError,
    http::{header, StatusCode},
    HttpResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::repository::RepositoryError;

/// The ways in which authenticating a request or a login attempt can fail.
///
/// Only two messages ever reach the client (see [`AuthError::public_detail`]); the variant
/// itself is kept for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token was presented.
    MissingToken,
    /// The token is malformed or its signature does not verify.
    Invalid,
    /// The token's `exp` claim lies in the past.
    Expired,
    /// The token verified but carries no `sub` claim.
    MissingSubject,
    /// Unknown username or wrong password at login.
    InvalidCredentials,
    /// The token names a user that no longer exists.
    UserNotFound,
}

impl AuthError {
    /// The message shown to the client.
    pub fn public_detail(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Incorrect username or password",
            AuthError::MissingToken => "Not authenticated",
            AuthError::Invalid
            | AuthError::Expired
            | AuthError::MissingSubject
            | AuthError::UserNotFound => "Could not validate credentials",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reason = match self {
            AuthError::MissingToken => "missing bearer token",
            AuthError::Invalid => "invalid token",
            AuthError::Expired => "expired token",
            AuthError::MissingSubject => "token has no subject",
            AuthError::InvalidCredentials => "invalid credentials",
            AuthError::UserNotFound => "token subject does not exist",
        };
        f.write_str(reason)
    }
}

/// A single field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Why it was rejected.
    pub message: String,
}

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to a specific type of error, often carrying a message
/// detailing the issue. These errors are then converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is required but missing (HTTP 401).
    Unauthorized(AuthError),
    /// The caller is authenticated but does not own the resource (HTTP 403).
    Forbidden(String),
    /// Represents a client-side error due to a malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// A uniqueness constraint was violated (HTTP 400). The caller may retry with different data.
    Conflict(String),
    /// Represents a situation where a requested resource was not found (HTTP 404).
    NotFound(String),
    /// Represents an unexpected server-side error (HTTP 500).
    InternalServerError(String),
    /// Represents an error originating from database operations (HTTP 500).
    /// The message is logged but never sent to the client.
    DatabaseError(String),
    /// Input failed field validation (HTTP 422 Unprocessable Entity).
    ValidationError(Vec<FieldError>),
}

impl AppError {
    /// Short machine-readable name of the error kind, used as the `error` field of the body.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::BadRequest(_) => "bad_request",
            AppError::Conflict(_) => "conflict",
            AppError::NotFound(_) => "not_found",
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => "internal_error",
            AppError::ValidationError(_) => "validation_error",
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Unauthorized(err) => err.public_detail().to_string(),
            AppError::Forbidden(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg)
            | AppError::InternalServerError(msg) => msg.clone(),
            AppError::DatabaseError(_) => "Internal server error".to_string(),
            AppError::ValidationError(_) => "Validation error".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(err) => write!(f, "Unauthorized: {}", err),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(fields) => {
                write!(f, "Validation Error: {} invalid field(s)", fields.len())
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        AppError::Unauthorized(error)
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Authentication failures also carry a `WWW-Authenticate: Bearer` challenge.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::BadRequest(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        if let AppError::Unauthorized(_) = self {
            response.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }

        match self {
            AppError::ValidationError(fields) => response.json(json!({
                "error": self.kind(),
                "detail": self.detail(),
                "fields": fields,
            })),
            _ => response.json(json!({
                "error": self.kind(),
                "detail": self.detail(),
            })),
        }
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// Specific cases like `sqlx::Error::RowNotFound` are mapped to `AppError::NotFound`,
/// while other database errors become `AppError::DatabaseError`.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => {
                log::error!("database error: {}", error);
                AppError::DatabaseError(error.to_string())
            }
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(error: RepositoryError) -> AppError {
        match error {
            RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Database(err) => err.into(),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`,
/// keeping one entry per failed rule so the client sees every offending field.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, failures)| {
                failures.iter().map(move |failure| FieldError {
                    field: field.to_string(),
                    message: failure
                        .message
                        .as_ref()
                        .map(|msg| msg.to_string())
                        .unwrap_or_else(|| format!("failed `{}` check", failure.code)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationError(fields)
    }
}

/// Converts `bcrypt::BcryptError` into `AppError::InternalServerError`.
///
/// This handles errors during password hashing.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(format!("Failed to hash password: {}", error))
    }
}
