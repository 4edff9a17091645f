//! HS256 access and refresh tokens.
//!
//! Access and refresh tokens are signed with different secrets, so one can never be
//! replayed as the other.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vidhub_core::config::AuthConfig;
use vidhub_core::models::{TokenPair, User};
use vidhub_core::AppError;

/// JWT claims carried by both token kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub username: String,
    pub exp: i64,
    pub iat: i64,
    /// Unique per token, so two tokens minted in the same second still differ
    pub jti: Uuid,
}

#[derive(Clone)]
struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKeys {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    fn sign(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.id,
            username: user.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    fn verify(&self, token: &str) -> Result<JwtClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<JwtClaims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                _ => AppError::Unauthorized("Invalid or expired token".to_string()),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Issues and verifies tokens for the configured secrets.
#[derive(Clone)]
pub struct TokenService {
    access: SigningKeys,
    refresh: SigningKeys,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access: SigningKeys::new(
                &config.access_token_secret,
                Duration::minutes(config.access_token_expiry_minutes),
            ),
            refresh: SigningKeys::new(
                &config.refresh_token_secret,
                Duration::days(config.refresh_token_expiry_days),
            ),
        }
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String, AppError> {
        self.access.sign(user)
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.access.sign(user)?,
            refresh_token: self.refresh.sign(user)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> Result<JwtClaims, AppError> {
        self.access.verify(token)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<JwtClaims, AppError> {
        self.refresh.verify(token)
    }
}
