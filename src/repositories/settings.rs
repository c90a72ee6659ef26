//! # Settings Repository
//!
//! There is a single settings row. It is created with defaults the first
//! time anything reads or writes it.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{
    Settings,
    settings::{self, Model as SettingsModel},
};

#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub company_phone: Option<String>,
    pub company_email: Option<String>,
    pub default_vat: Option<f64>,
    /// `Some(None)` clears the signature.
    pub checker_signature: Option<Option<String>>,
}

async fn current_or_default<C: ConnectionTrait>(conn: &C) -> Result<SettingsModel, RepositoryError> {
    if let Some(existing) = Settings::find().one(conn).await? {
        return Ok(existing);
    }
    Ok(settings::defaults(Utc::now().into()).insert(conn).await?)
}

pub struct SettingsRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> SettingsRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_or_create(&self) -> Result<SettingsModel, RepositoryError> {
        current_or_default(self.db).await
    }

    /// Read-modify-write of the singleton inside one transaction.
    pub async fn update(
        &self,
        changes: SettingsUpdate,
        updated_by: Uuid,
    ) -> Result<SettingsModel, RepositoryError> {
        if changes.default_vat.is_some_and(|vat| vat < 0.0 || !vat.is_finite()) {
            return Err(RepositoryError::validation(
                "Default VAT must be a non-negative number",
            ));
        }

        let txn = self.db.begin().await?;
        let mut active = current_or_default(&txn).await?.into_active_model();

        if let Some(company_name) = changes.company_name {
            active.company_name = Set(company_name);
        }
        if let Some(company_address) = changes.company_address {
            active.company_address = Set(company_address);
        }
        if let Some(company_phone) = changes.company_phone {
            active.company_phone = Set(company_phone);
        }
        if let Some(company_email) = changes.company_email {
            active.company_email = Set(company_email);
        }
        if let Some(default_vat) = changes.default_vat {
            active.default_vat = Set(default_vat);
        }
        if let Some(checker_signature) = changes.checker_signature {
            active.checker_signature = Set(checker_signature);
        }
        active.updated_at = Set(Utc::now().into());
        active.updated_by = Set(Some(updated_by));

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }
}
