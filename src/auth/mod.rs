//! Authentication: token issuance and verification, the bearer middleware
//! guarding private routes, identity binding for self-service routes, and
//! the password primitives (argon2 hashing, policy-satisfying generation).

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Claim structure for issued tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub jti: String, // Unique identifier for this token
    pub iat: i64,    // Issued at time
    pub exp: i64,    // Expiration time
}

/// Authenticated principal extracted from a verified bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub token_id: String,
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token subject does not match the request")]
    IdentityMismatch,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Password hashing failed: {0}")]
    Hash(String),
}

impl AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth
            | Self::InvalidCredentials
            | Self::InvalidToken
            | Self::TokenExpired
            | Self::IdentityMismatch => StatusCode::UNAUTHORIZED,
            Self::TokenCreation(_) | Self::Hash(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        }));

        (status, body).into_response()
    }
}

impl From<AuthError> for crate::errors::ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenCreation(msg) | AuthError::Hash(msg) => {
                crate::errors::ServiceError::Internal(anyhow::anyhow!(msg))
            }
            other => crate::errors::ServiceError::Unauthorized(other.to_string()),
        }
    }
}

/// Token issuance and verification.
#[derive(Clone)]
pub struct AuthService {
    secret: String,
    expiry: Duration,
}

impl AuthService {
    pub fn new(secret: String, expiry: Duration) -> Self {
        Self { secret, expiry }
    }

    /// Issues a signed token embedding the account id.
    pub fn issue_token(&self, user_id: i32) -> Result<String, AuthError> {
        let now = chrono::Utc::now();

        let claims = Claims {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::seconds(self.expiry.as_secs() as i64)).timestamp(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })
    }

    fn principal(&self, token: &str) -> Result<AuthUser, AuthError> {
        let claims = self.verify_token(token)?;
        let user_id = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthUser {
            user_id,
            token_id: claims.jti,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Bearer middleware: protected handlers only run once the token has been
/// verified; the principal travels in request extensions.
pub async fn require_auth(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token else {
        return AuthError::MissingAuth.into_response();
    };

    match auth.principal(token) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => err.into_response(),
    }
}

/// Identity binding: on self-service routes the verified token subject must
/// match the id the request claims to act for.
pub fn ensure_self(user: &AuthUser, claimed_id: i32) -> Result<(), AuthError> {
    if user.user_id == claimed_id {
        Ok(())
    } else {
        Err(AuthError::IdentityMismatch)
    }
}

/// Hashes a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Constant-time comparison of a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!@#$%&*+-_?";

/// Generates a random password satisfying the password gate: one character
/// from each required class, the rest drawn from all classes, shuffled.
pub fn generate_password(length: usize) -> String {
    use rand::seq::SliceRandom;

    let mut rng = rand::thread_rng();
    let length = length.max(8);

    let mut chars = vec![
        UPPER[rng.gen_range(0..UPPER.len())],
        LOWER[rng.gen_range(0..LOWER.len())],
        DIGITS[rng.gen_range(0..DIGITS.len())],
        SYMBOLS[rng.gen_range(0..SYMBOLS.len())],
    ];

    let all: Vec<u8> = [UPPER, LOWER, DIGITS, SYMBOLS].concat();
    while chars.len() < length {
        chars.push(all[rng.gen_range(0..all.len())]);
    }
    chars.shuffle(&mut rng);

    String::from_utf8_lossy(&chars).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates::validate::password_ok;

    fn service() -> AuthService {
        AuthService::new(
            "unit-test-signing-key-0123456789abcdef".into(),
            Duration::from_secs(3600),
        )
    }

    #[test]
    fn token_round_trip() {
        let auth = service();
        let token = auth.issue_token(42).unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert!(claims.exp > claims.iat);

        let principal = auth.principal(&token).unwrap();
        assert_eq!(principal.user_id, 42);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = service().issue_token(42).unwrap();
        let other = AuthService::new(
            "a-different-signing-key-0123456789abcdef".into(),
            Duration::from_secs(3600),
        );

        assert!(matches!(
            other.verify_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_rejected() {
        let auth = service();
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: "42".into(),
            jti: Uuid::new_v4().to_string(),
            iat: (now - chrono::Duration::hours(2)).timestamp(),
            exp: (now - chrono::Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("unit-test-signing-key-0123456789abcdef".as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            auth.verify_token(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn identity_binding() {
        let user = AuthUser {
            user_id: 7,
            token_id: "jti".into(),
        };
        assert!(ensure_self(&user, 7).is_ok());
        assert!(matches!(
            ensure_self(&user, 8),
            Err(AuthError::IdentityMismatch)
        ));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("Abcdef1!").unwrap();
        assert_ne!(hash, "Abcdef1!");
        assert!(verify_password("Abcdef1!", &hash).unwrap());
        assert!(!verify_password("abcdef1!", &hash).unwrap());
    }

    #[test]
    fn generated_password_meets_policy() {
        for _ in 0..32 {
            let password = generate_password(12);
            assert_eq!(password.len(), 12);
            assert!(password_ok(&password, 8, 50), "weak: {}", password);
        }
    }
}
