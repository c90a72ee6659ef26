//! # Authentication Handlers
//!
//! Login issues a JWT both as the `token` cookie and in the response body so
//! browser and API clients can use whichever transport suits them.

use axum::{extract::State, response::Json};
use axum_extra::extract::{WithRejection, cookie::CookieJar};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{
    ACCOUNT_DEACTIVATED, AuthUser, Claims, session_cookie, session_cookie_removal,
};
use crate::error::{ApiError, bad_request, unauthorized};
use crate::handlers::types::{JsonBody, MessageResponse, UserResponse, non_blank};
use crate::password;
use crate::repositories::UserRepository;
use crate::server::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: Option<String>,
    #[schema(example = "correct horse battery staple")]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserResponse,
    /// Bearer token; the same value is set as the `token` cookie
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: UserResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user: Claims,
}

/// Exchange credentials for a session
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = LoginResponse, headers(
            ("Set-Cookie", description = "HttpOnly `token` cookie")
        )),
        (status = 400, description = "Username or password missing", body = ApiError),
        (status = 401, description = "Invalid credentials or deactivated account", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(request), _): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let (Some(username), Some(password)) = (
        non_blank(request.username),
        request.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(bad_request("Username and password are required"));
    };

    let repo = UserRepository::new(&state.db);
    let Some(user) = repo.find_by_username(&username).await? else {
        tracing::info!(%username, "Login rejected: unknown username");
        return Err(unauthorized(Some(INVALID_CREDENTIALS)));
    };

    if !password::verify_password(password, user.password_hash.clone()).await? {
        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
        return Err(unauthorized(Some(INVALID_CREDENTIALS)));
    }

    if !user.is_active {
        return Err(unauthorized(Some(ACCOUNT_DEACTIVATED)));
    }

    let user = repo.record_login(user).await?;
    let token = state
        .jwt
        .issue(&user)
        .map_err(|e| anyhow::anyhow!("failed to sign session token: {e}"))?;

    let jar = jar.add(session_cookie(
        token.clone(),
        state.jwt.ttl(),
        state.config.secure_cookies(),
    ));

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
    Ok((
        jar,
        Json(LoginResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(session_cookie_removal(state.config.secure_cookies()));
    (jar, Json(MessageResponse::new("Logged out successfully")))
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/auth/me",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Authenticated user", body = MeResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: auth.user.into(),
    })
}

/// Validate the presented token
#[utoipa::path(
    get,
    path = "/auth/verify",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Token is valid", body = VerifyResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn verify(auth: AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        user: auth.claims,
    })
}
