//! Admin session cookie.
//!
//! A successful login sets an HttpOnly cookie holding an HS256 token. Admin
//! routes are guarded by the [`AdminSession`] extractor, which reads the
//! cookie and checks the token's signature and expiry.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{request::Parts, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{hash_password, is_password_hash, verify_password};
use crate::config::AdminConfig;
use crate::web::error::ApiError;
use crate::SiteError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Claims carried by the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Admin username.
    pub sub: String,
    /// Issued at (unix seconds).
    pub iat: u64,
    /// Expiration (unix seconds).
    pub exp: u64,
    /// Token ID.
    pub jti: String,
}

impl SessionClaims {
    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        i64::try_from(self.exp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_default()
    }
}

/// Keys and credentials for admin sessions.
#[derive(Clone)]
pub struct SessionState {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
    username: String,
    password_hash: Option<String>,
}

impl SessionState {
    /// Create session state from a signing secret, the admin username and
    /// an Argon2 hash of the admin password. Without a hash nobody can log in.
    pub fn new(
        secret: &str,
        ttl_secs: u64,
        username: impl Into<String>,
        password_hash: Option<String>,
    ) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
            username: username.into(),
            password_hash,
        }
    }

    /// Create session state from the admin section of the configuration.
    ///
    /// `password_hash` is used as given; otherwise a plain `password` is
    /// hashed here so it is never compared directly.
    pub fn from_config(config: &AdminConfig) -> crate::Result<Self> {
        let password_hash = if !config.password_hash.is_empty() {
            if !is_password_hash(&config.password_hash) {
                return Err(SiteError::Config(
                    "admin.password_hash is not a valid PHC hash string".to_string(),
                ));
            }
            Some(config.password_hash.clone())
        } else if !config.password.is_empty() {
            let hash = hash_password(&config.password)
                .map_err(|e| SiteError::Config(format!("admin.password: {e}")))?;
            Some(hash)
        } else {
            None
        };

        Ok(Self::new(
            &config.session_secret,
            config.session_ttl_secs,
            &config.username,
            password_hash,
        ))
    }

    /// Check a login attempt against the configured admin account.
    pub fn check_credentials(&self, username: &str, password: &str) -> bool {
        let Some(hash) = self.password_hash.as_deref() else {
            return false;
        };
        let password_ok = verify_password(password, hash).is_ok();
        password_ok && username == self.username
    }

    /// Issue a signed token for a user.
    pub fn issue(&self, username: &str) -> Result<(String, SessionClaims), ApiError> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = SessionClaims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.ttl_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode session token: {}", e);
            ApiError::internal("Failed to create session")
        })?;

        Ok((token, claims))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, ApiError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Session token rejected: {}", e);
                ApiError::unauthorized("Invalid or expired session")
            })
    }

    /// Cookie carrying a session token.
    pub fn session_cookie(token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Cookie that clears the session.
    pub fn removal_cookie() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, "")).path("/").build()
    }
}

/// Extractor for requests carrying a valid admin session.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Login required"))?;

        let session = parts
            .extensions
            .get::<Arc<SessionState>>()
            .ok_or_else(|| ApiError::internal("Session state not configured"))?;

        Ok(AdminSession(session.verify(&token)?))
    }
}

/// Middleware that makes the session state available to extractors.
pub async fn session_layer(
    session: Arc<SessionState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(session);
    next.run(request).await
}
