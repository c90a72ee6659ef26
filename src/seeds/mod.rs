//! Database seeding
//!
//! Runs once at startup after migrations. Creates the first admin account
//! when none exists and stores the default settings row.

use anyhow::{Context, Result, bail};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::models::Role;
use crate::password;
use crate::repositories::{SettingsRepository, UserRepository, user::NewUser};

/// Seeds everything the service needs to be usable.
pub async fn seed_all(db: &DatabaseConnection, config: &AppConfig) -> Result<()> {
    seed_admin(db, config).await?;
    seed_settings(db).await?;
    Ok(())
}

/// Creates the configured admin account unless an admin already exists.
///
/// The password is taken from `PRICECMP_ADMIN_PASSWORD`; there is no
/// built-in default.
pub async fn seed_admin(db: &DatabaseConnection, config: &AppConfig) -> Result<()> {
    let repo = UserRepository::new(db);

    if repo
        .exists_with_role(Role::Admin)
        .await
        .context("failed to look up admin accounts")?
    {
        tracing::debug!("Admin account present, skipping seed");
        return Ok(());
    }

    let Some(admin_password) = config.admin_password.clone() else {
        bail!("no admin account exists and PRICECMP_ADMIN_PASSWORD is not set");
    };
    password::validate_password(&admin_password)
        .context("PRICECMP_ADMIN_PASSWORD is too short")?;

    if repo
        .find_by_username(&config.admin_username)
        .await
        .context("failed to look up admin username")?
        .is_some()
    {
        bail!(
            "username '{}' is taken by a non-admin account; choose another PRICECMP_ADMIN_USERNAME",
            config.admin_username
        );
    }

    let password_hash = password::hash_password(admin_password)
        .await
        .context("failed to hash admin password")?;

    let admin = repo
        .create(NewUser {
            username: config.admin_username.clone(),
            password_hash,
            role: Role::Admin,
            name: "Administrator".to_string(),
            is_active: true,
        })
        .await
        .context("failed to create admin account")?;

    tracing::info!(user_id = %admin.id, username = %admin.username, "Seeded admin account");
    Ok(())
}

/// Stores the default settings row if it is missing.
pub async fn seed_settings(db: &DatabaseConnection) -> Result<()> {
    let settings = SettingsRepository::new(db)
        .get_or_create()
        .await
        .context("failed to seed settings")?;
    tracing::debug!(settings_id = %settings.id, "Settings present");
    Ok(())
}
