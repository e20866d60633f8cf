use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AuthError};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id rendered as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: i64,
}

/// Issues and resolves bearer tokens signed with a process-wide HS256 secret.
///
/// The service holds no other state: a token is valid exactly when its signature verifies
/// and its expiry lies in the future. There is no revocation.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Lifetime of tokens issued without an explicit ttl.
    pub const DEFAULT_TTL_MINUTES: i64 = 30;

    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// A service whose tokens live for [`Self::DEFAULT_TTL_MINUTES`].
    pub fn with_default_ttl(secret: &str) -> Self {
        Self::new(secret, Duration::minutes(Self::DEFAULT_TTL_MINUTES))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user_id` using the configured ttl.
    pub fn issue(&self, user_id: i32) -> Result<String, AppError> {
        self.issue_with_ttl(user_id, self.ttl)
    }

    /// Issues a token for `user_id` that expires `ttl` from now.
    pub fn issue_with_ttl(&self, user_id: i32, ttl: Duration) -> Result<String, AppError> {
        let expiration = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

        let claims = Claims {
            sub: Some(user_id.to_string()),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies `token` and returns the user id it was issued for.
    pub fn resolve(&self, token: &str) -> Result<i32, AuthError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid,
            })?;

        claims
            .sub
            .ok_or(AuthError::MissingSubject)?
            .parse()
            .map_err(|_| AuthError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_for_tokens";

    fn service() -> TokenService {
        TokenService::with_default_ttl(SECRET)
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = service();
        let token = tokens.issue(1).unwrap();
        assert_eq!(tokens.resolve(&token), Ok(1));
        assert_eq!(tokens.ttl(), Duration::minutes(30));
    }

    #[test]
    fn test_subject_is_a_string() {
        let tokens = service();
        let token = tokens.issue(42).unwrap();

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        let claims = decode::<serde_json::Value>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &validation,
        )
        .unwrap()
        .claims;

        assert_eq!(claims["sub"], "42");
        assert!(claims["exp"].is_i64());
    }

    #[test]
    fn test_token_expiration() {
        let tokens = service();
        let expired = tokens.issue_with_ttl(2, Duration::seconds(-5)).unwrap();
        assert_eq!(tokens.resolve(&expired), Err(AuthError::Expired));
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let tokens = service();
        let err = tokens
            .issue_with_ttl(1, Duration::seconds(i64::MAX / 1000))
            .unwrap_err();
        assert!(matches!(err, AppError::InternalServerError(_)));
    }

    #[test]
    fn test_invalid_token_signature() {
        let other = TokenService::with_default_ttl("a_completely_different_secret");
        let token = other.issue(3).unwrap();
        assert_eq!(service().resolve(&token), Err(AuthError::Invalid));
    }

    #[test]
    fn test_malformed_token() {
        assert_eq!(service().resolve("not-a-jwt"), Err(AuthError::Invalid));
        assert_eq!(service().resolve(""), Err(AuthError::Invalid));
    }

    #[test]
    fn test_missing_subject() {
        let claims = Claims {
            sub: None,
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service().resolve(&token), Err(AuthError::MissingSubject));
    }

    #[test]
    fn test_non_numeric_subject() {
        let claims = Claims {
            sub: Some("alice".to_string()),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert_eq!(service().resolve(&token), Err(AuthError::Invalid));
    }
}
