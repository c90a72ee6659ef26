//! # User Handlers
//!
//! Account management. Who may touch which account is decided in
//! [`crate::permissions`]; this module only gathers the inputs.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::AuthUser;
use crate::error::{ApiError, bad_request};
use crate::handlers::types::{
    IdPath, JsonBody, MessageResponse, UserResponse, non_blank, optional_non_blank,
};
use crate::models::Role;
use crate::password;
use crate::permissions::{self, TargetUser, UserChanges};
use crate::repositories::{
    UserRepository,
    user::{NewUser, UserUpdate},
};
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[schema(example = "jdoe")]
    pub username: Option<String>,
    #[schema(example = "s3cure-passw0rd")]
    pub password: Option<String>,
    pub role: Option<Role>,
    #[schema(example = "Jane Doe")]
    pub name: Option<String>,
    /// Defaults to true
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// List user accounts
#[utoipa::path(
    get,
    path = "/users",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Users, newest first; checkers only see makers", body = [UserResponse]),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Insufficient permissions", body = ApiError)
    ),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    permissions::authorize_user_management(auth.role())?;

    let role_filter = (auth.role() == Role::Checker).then_some(Role::Maker);
    let users = UserRepository::new(&state.db).list(role_filter).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create a user account
#[utoipa::path(
    post,
    path = "/users",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Missing fields, short password or username taken", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 403, description = "Role may not create this account", body = ApiError)
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): JsonBody<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    permissions::authorize_user_management(auth.role())?;

    let (Some(username), Some(password), Some(role), Some(name)) = (
        non_blank(request.username),
        request.password.filter(|p| !p.is_empty()),
        request.role,
        non_blank(request.name),
    ) else {
        return Err(bad_request("All fields are required"));
    };

    password::validate_password(&password)?;
    permissions::authorize_user_creation(auth.role(), role)?;
    let password_hash = password::hash_password(password).await?;

    let user = UserRepository::new(&state.db)
        .create(NewUser {
            username,
            password_hash,
            role,
            name,
            is_active: request.is_active.unwrap_or(true),
        })
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, created_by = %auth.id(), "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Get a user account
#[utoipa::path(
    get,
    path = "/users/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 403, description = "Makers may only fetch themselves", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<UserResponse>, ApiError> {
    permissions::authorize_user_view(auth.actor(), id)?;
    let user = UserRepository::new(&state.db).get(id).await?;
    Ok(Json(user.into()))
}

/// Update a user account
#[utoipa::path(
    put,
    path = "/users/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Self-deactivation, short password or username taken", body = ApiError),
        (status = 403, description = "Not allowed to change this account or field", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(request), _): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let repo = UserRepository::new(&state.db);
    let target = repo.get(id).await?;

    permissions::authorize_user_update(
        auth.actor(),
        TargetUser {
            id: target.id,
            role: target.role,
        },
        UserChanges {
            username: request.username.is_some(),
            role: request.role,
            is_active: request.is_active,
        },
    )?;

    let password_hash = match request.password {
        Some(password) => {
            password::validate_password(&password)?;
            Some(password::hash_password(password).await?)
        }
        None => None,
    };

    let updated = repo
        .update(
            id,
            UserUpdate {
                username: optional_non_blank(request.username, "Username")?,
                password_hash,
                role: request.role,
                name: optional_non_blank(request.name, "Name")?,
                is_active: request.is_active,
            },
        )
        .await?;

    tracing::info!(user_id = %updated.id, updated_by = %auth.id(), "User updated");
    Ok(Json(updated.into()))
}

/// Delete a user account
#[utoipa::path(
    delete,
    path = "/users/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Own account, or the user still has records", body = ApiError),
        (status = 403, description = "Only admins may delete users", body = ApiError),
        (status = 404, description = "User not found", body = ApiError)
    ),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    permissions::authorize_user_deletion(auth.actor(), id)?;
    UserRepository::new(&state.db).delete(id).await?;

    tracing::info!(user_id = %id, deleted_by = %auth.id(), "User deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_reads_camel_case() {
        let request: UpdateUserRequest =
            serde_json::from_str(r#"{"isActive": false, "role": "checker"}"#).unwrap();
        assert_eq!(request.is_active, Some(false));
        assert_eq!(request.role, Some(Role::Checker));
        assert!(request.username.is_none());
    }

    #[test]
    fn unknown_role_is_a_body_error() {
        let parsed = serde_json::from_str::<CreateUserRequest>(r#"{"role": "superuser"}"#);
        assert!(parsed.is_err());
    }
}
