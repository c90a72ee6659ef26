//! # Authentication
//!
//! Session tokens are HS256 JWTs carried either in the `token` cookie or in
//! an `Authorization: Bearer` header. When both are present the cookie wins.
//! The middleware reloads the account on every request, so a deleted or
//! deactivated user is locked out immediately and role changes apply to the
//! next request.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, unauthorized};
use crate::models::{Role, user};
use crate::permissions::Actor;
use crate::repositories::UserRepository;
use crate::server::AppState;

/// Name of the session cookie.
pub const TOKEN_COOKIE: &str = "token";

const AUTHENTICATION_REQUIRED: &str = "Authentication required";
const INVALID_TOKEN: &str = "Invalid or expired token";
pub const ACCOUNT_DEACTIVATED: &str = "Account is deactivated";

/// JWT payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Signing material derived from the configured secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            Duration::hours(config.jwt_ttl_hours),
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user: &user::Model) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
}

/// Pulls the session token from the cookie, falling back to the bearer header.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        let value = cookie.value().trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Session cookie carrying a freshly issued token.
pub fn session_cookie(token: String, ttl: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Template for removing the session cookie; attributes must match the
/// cookie that was set.
pub fn session_cookie_removal(secure: bool) -> Cookie<'static> {
    Cookie::build(TOKEN_COOKIE)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// The authenticated caller, as loaded from the database for this request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: user::Model,
    pub claims: Claims,
}

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn actor(&self) -> Actor {
        Actor {
            id: self.user.id,
            role: self.user.role,
        }
    }
}

/// Rejects requests without a valid session and attaches [`AuthUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| unauthorized(Some(AUTHENTICATION_REQUIRED)))?;

    let claims = state.jwt.verify(&token).map_err(|error| {
        tracing::debug!(%error, "Rejected session token");
        unauthorized(Some(INVALID_TOKEN))
    })?;

    let user = UserRepository::new(&state.db)
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| unauthorized(Some(INVALID_TOKEN)))?;

    if !user.is_active {
        return Err(unauthorized(Some(ACCOUNT_DEACTIVATED)));
    }

    tracing::debug!(user_id = %user.id, role = %user.role, "Authenticated request");
    request.extensions_mut().insert(AuthUser { user, claims });

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| unauthorized(Some(AUTHENTICATION_REQUIRED)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{
        HeaderValue,
        header::{COOKIE, SET_COOKIE},
    };
    use axum::response::IntoResponse;

    fn keys() -> JwtKeys {
        JwtKeys::new(b"0123456789abcdef0123456789abcdef", Duration::hours(1))
    }

    fn sample_user() -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            username: "maker1".to_string(),
            password_hash: "irrelevant".to_string(),
            role: Role::Maker,
            name: "Maker One".to_string(),
            is_active: true,
            created_at: Utc::now().into(),
            last_login: None,
        }
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let user = sample_user();
        let token = keys().issue(&user).unwrap();
        let claims = keys().verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "maker1");
        assert_eq!(claims.role, Role::Maker);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let other = JwtKeys::new(b"ffffffffffffffffffffffffffffffff", Duration::hours(1));
        let token = other.issue(&sample_user()).unwrap();
        assert!(keys().verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let expired = JwtKeys::new(b"0123456789abcdef0123456789abcdef", Duration::hours(-2));
        let token = expired.issue(&sample_user()).unwrap();
        assert!(keys().verify(&token).is_err());
    }

    #[test]
    fn cookie_takes_precedence_over_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; token=from-cookie"));

        assert_eq!(extract_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn bearer_used_without_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dGVzdDoxMjM="));
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let cookie = session_cookie("abc".to_string(), Duration::days(7), false);
        assert_eq!(cookie.name(), TOKEN_COOKIE);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::seconds(604800)));
        assert_eq!(cookie.secure(), Some(false));

        let secure = session_cookie("abc".to_string(), Duration::minutes(1), true);
        assert!(secure.to_string().contains("Secure"));
    }

    #[test]
    fn removing_session_cookie_expires_it() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token=abc"));
        let jar = CookieJar::from_headers(&headers).remove(session_cookie_removal(false));

        assert!(jar.get(TOKEN_COOKIE).is_none());
        let response = jar.into_response();
        let removal = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(removal.starts_with("token=;"));
        assert!(removal.contains("Max-Age=0"));
        assert!(removal.contains("Path=/"));
    }
}
