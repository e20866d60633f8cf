use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account.
///
/// `password_digest` is produced by the credential store and is never serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_digest: String,
}
