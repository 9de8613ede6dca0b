//! JWT access tokens
//!
//! Token issuance exists for tooling and tests; the gateway only validates.
//! `JwtService` is the gateway's [`IdentityProvider`].

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use room_core::{DomainError, IdentityProvider, Snowflake};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Get the user ID as a Snowflake
    ///
    /// # Errors
    /// Returns an error if the subject is not a non-zero numeric id
    pub fn user_id(&self) -> Result<Snowflake, AppError> {
        self.sub
            .parse::<Snowflake>()
            .ok()
            .filter(|id| !id.is_zero())
            .ok_or(AppError::InvalidToken)
    }
}

/// HS256 token validation (and issuance)
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry: i64,
}

impl JwtService {
    #[must_use]
    pub fn new(secret: &str, access_token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry,
        }
    }

    /// Issue an access token for a user
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue_access_token(&self, user_id: Snowflake) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to encode JWT")))
    }

    /// Decode and validate an access token
    ///
    /// A leading `Bearer ` prefix is accepted.
    ///
    /// # Errors
    /// Returns an error if the token is invalid or expired
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AppError> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })
    }
}

#[async_trait]
impl IdentityProvider for JwtService {
    async fn resolve(&self, credential: &str) -> Result<Snowflake, DomainError> {
        let claims = self.validate_access_token(credential)?;
        Ok(claims.user_id()?)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expiry", &self.access_token_expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use room_core::ErrorKind;

    fn create_test_service() -> JwtService {
        JwtService::new("test-secret-key-that-is-long-enough", 900)
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service();
        let token = service.issue_access_token(Snowflake::new(12345)).unwrap();

        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, "12345");
        assert_eq!(claims.user_id().unwrap(), Snowflake::new(12345));
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_bearer_prefix_is_stripped() {
        let service = create_test_service();
        let token = service.issue_access_token(Snowflake::new(7)).unwrap();
        assert!(service
            .validate_access_token(&format!("Bearer {token}"))
            .is_ok());
    }

    #[test]
    fn test_invalid_and_foreign_tokens() {
        let service = create_test_service();
        assert!(matches!(
            service.validate_access_token("invalid.token.here"),
            Err(AppError::InvalidToken)
        ));

        let other = JwtService::new("another-secret-entirely", 900);
        let token = other.issue_access_token(Snowflake::new(1)).unwrap();
        assert!(service.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new("test-secret-key-that-is-long-enough", -3600);
        let token = service.issue_access_token(Snowflake::new(1)).unwrap();
        assert!(matches!(
            service.validate_access_token(&token),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn test_claims_user_id_rejects_garbage() {
        let claims = Claims {
            sub: "not-a-number".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        assert!(claims.user_id().is_err());

        let claims = Claims {
            sub: "0".to_string(),
            iat: 0,
            exp: i64::MAX,
        };
        assert!(claims.user_id().is_err());
    }

    #[tokio::test]
    async fn test_resolve_as_identity_provider() {
        let service = create_test_service();
        let token = service.issue_access_token(Snowflake::new(42)).unwrap();

        let user = service.resolve(&token).await.unwrap();
        assert_eq!(user, Snowflake::new(42));

        let err = service.resolve("garbage").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }
}
