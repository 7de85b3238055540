//! Signed-credential issue/verify and the caller-identity extractor.
//!
//! One credential format (HS256 JWT with explicit expiry), one validation
//! point (the [`AuthUser`] extractor). Handlers receive the caller identity
//! as a plain value; nothing downstream re-derives it from raw credentials.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use bcrypt::DEFAULT_COST;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Role;
use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing material plus token lifetime, built once from config and shared
/// through `AppState`.
#[derive(Clone)]
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl AuthKeys {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, id: Uuid, username: &str, role: Role) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: id,
            username: username.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|err| {
            tracing::error!(error = %err, "failed to sign token");
            ApiError::Internal("Could not issue token".to_string())
        })
    }

    /// Checks signature and expiry (`Validation::default()` enforces `exp`).
    pub fn verify(&self, token: &str) -> Result<AuthUser, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
        let role = Role::parse(&data.claims.role)
            .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
        Ok(AuthUser {
            id: data.claims.sub,
            username: data.claims.username,
            role,
        })
    }
}

/// The caller identity a verified credential resolves to.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    /// Elevated access: admin and superadmin are one equivalence class.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role.is_elevated() {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Insufficient permissions. Admin or Superadmin role required.".to_string(),
            ))
        }
    }

    /// Mutating another elevated account takes exactly superadmin.
    pub fn require_superadmin(&self) -> Result<(), ApiError> {
        if self.role == Role::Superadmin {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Superadmin role required.".to_string(),
            ))
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;
        AuthKeys::from_ref(state).verify(token)
    }
}

/// bcrypt is deliberately CPU-heavy; keep it off the async executor.
pub async fn hash_password(plaintext: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, DEFAULT_COST))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "hash task panicked");
            ApiError::Internal("Failed to process password".to_string())
        })?
        .map_err(|err| {
            tracing::error!(error = %err, "bcrypt hash failed");
            ApiError::Internal("Failed to process password".to_string())
        })
}

pub async fn verify_password(plaintext: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "verify task panicked");
            ApiError::Unauthorized("Invalid credentials".to_string())
        })?
        .map_err(|_| ApiError::Unauthorized("Invalid credentials".to_string()))
}
