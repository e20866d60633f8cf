#![doc = "The `taskkeeper` library crate."]
#![doc = ""]
#![doc = "Registration, login and per-user task ownership for the taskkeeper server:"]
#![doc = "domain models, authentication, storage backends, the authorization-gated task"]
#![doc = "service, routing configuration and error handling. The binary (`main.rs`)"]
#![doc = "wires these together into an HTTP server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

pub use crate::error::{AppError, AuthError};
pub use crate::service::TaskService;
