//! # User Repository
//!
//! Persistence for user accounts. Usernames are unique; the check here runs
//! before the unique index so callers get a readable conflict message.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{
    Attachment, Comparison, Role, Settings, User, attachment, comparison, settings,
    user::{self, ActiveModel as UserActiveModel, Model as UserModel},
};

pub const USERNAME_TAKEN: &str = "Username already exists";
pub const USER_NOT_FOUND: &str = "User not found";

/// Data for inserting a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub name: String,
    pub is_active: bool,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for User database operations
pub struct UserRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> UserRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest accounts first, optionally restricted to one role.
    pub async fn list(&self, role: Option<Role>) -> Result<Vec<UserModel>, RepositoryError> {
        let mut query = User::find().order_by_desc(user::Column::CreatedAt);
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(role));
        }
        Ok(query.all(self.db).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserModel>, RepositoryError> {
        Ok(User::find_by_id(id).one(self.db).await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<UserModel, RepositoryError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(USER_NOT_FOUND))
    }

    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserModel>, RepositoryError> {
        Ok(User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db)
            .await?)
    }

    pub async fn exists_with_role(&self, role: Role) -> Result<bool, RepositoryError> {
        let count = User::find()
            .filter(user::Column::Role.eq(role))
            .count(self.db)
            .await?;
        Ok(count > 0)
    }

    pub async fn create(&self, new_user: NewUser) -> Result<UserModel, RepositoryError> {
        if self.find_by_username(&new_user.username).await?.is_some() {
            return Err(RepositoryError::conflict(USERNAME_TAKEN));
        }

        let model = UserActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(new_user.username),
            password_hash: Set(new_user.password_hash),
            role: Set(new_user.role),
            name: Set(new_user.name),
            is_active: Set(new_user.is_active),
            created_at: Set(Utc::now().into()),
            last_login: Set(None),
        };

        Ok(model.insert(self.db).await?)
    }

    pub async fn update(&self, id: Uuid, changes: UserUpdate) -> Result<UserModel, RepositoryError> {
        let existing = self.get(id).await?;

        if let Some(username) = changes.username.as_deref() {
            if username != existing.username {
                if let Some(holder) = self.find_by_username(username).await? {
                    if holder.id != id {
                        return Err(RepositoryError::conflict(USERNAME_TAKEN));
                    }
                }
            }
        }

        let mut active = existing.into_active_model();
        if let Some(username) = changes.username {
            active.username = Set(username);
        }
        if let Some(password_hash) = changes.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }

        Ok(active.update(self.db).await?)
    }

    pub async fn record_login(&self, user: UserModel) -> Result<UserModel, RepositoryError> {
        let mut active = user.into_active_model();
        active.last_login = Set(Some(Utc::now().into()));
        Ok(active.update(self.db).await?)
    }

    /// True when comparisons, attachments or the settings row point at the user.
    pub async fn has_references(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let comparisons = Comparison::find()
            .filter(
                comparison::Column::CreatedBy
                    .eq(id)
                    .or(comparison::Column::ReviewedBy.eq(id)),
            )
            .count(self.db)
            .await?;
        if comparisons > 0 {
            return Ok(true);
        }

        let attachments = Attachment::find()
            .filter(attachment::Column::UploadedBy.eq(id))
            .count(self.db)
            .await?;
        if attachments > 0 {
            return Ok(true);
        }

        let settings = Settings::find()
            .filter(settings::Column::UpdatedBy.eq(id))
            .count(self.db)
            .await?;
        Ok(settings > 0)
    }

    /// Deletes a user that nothing references.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let existing = self.get(id).await?;

        if self.has_references(id).await? {
            return Err(RepositoryError::conflict(
                "User has existing records and cannot be deleted; deactivate the account instead",
            ));
        }

        User::delete_by_id(existing.id).exec(self.db).await?;
        Ok(())
    }
}
