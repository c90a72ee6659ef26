//! # Vendor Repository

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{
    ComparisonVendor, Vendor, comparison_vendor,
    vendor::{self, ActiveModel as VendorActiveModel, Model as VendorModel},
};

pub const VENDOR_NOT_FOUND: &str = "Vendor not found";

#[derive(Debug, Clone)]
pub struct NewVendor {
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub vat: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VendorUpdate {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub vat: Option<f64>,
    pub is_active: Option<bool>,
}

pub struct VendorRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> VendorRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// All vendors by name.
    pub async fn list(&self) -> Result<Vec<VendorModel>, RepositoryError> {
        Ok(Vendor::find()
            .order_by_asc(vendor::Column::Name)
            .all(self.db)
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<VendorModel, RepositoryError> {
        Vendor::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found(VENDOR_NOT_FOUND))
    }

    pub async fn create(&self, new_vendor: NewVendor) -> Result<VendorModel, RepositoryError> {
        let model = VendorActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_vendor.name),
            contact_person: Set(new_vendor.contact_person),
            email: Set(new_vendor.email),
            phone: Set(new_vendor.phone),
            address: Set(new_vendor.address),
            vat: Set(new_vendor.vat),
            is_active: Set(new_vendor.is_active),
            created_at: Set(Utc::now().into()),
        };
        Ok(model.insert(self.db).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        changes: VendorUpdate,
    ) -> Result<VendorModel, RepositoryError> {
        let mut active = self.get(id).await?.into_active_model();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(contact_person) = changes.contact_person {
            active.contact_person = Set(contact_person);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(phone) = changes.phone {
            active.phone = Set(phone);
        }
        if let Some(address) = changes.address {
            active.address = Set(address);
        }
        if let Some(vat) = changes.vat {
            active.vat = Set(vat);
        }
        if let Some(is_active) = changes.is_active {
            active.is_active = Set(is_active);
        }
        Ok(active.update(self.db).await?)
    }

    /// Vendors quoted on a comparison stay in place; deactivate them instead.
    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let existing = self.get(id).await?;

        let links = ComparisonVendor::find()
            .filter(comparison_vendor::Column::VendorId.eq(id))
            .count(self.db)
            .await?;
        if links > 0 {
            return Err(RepositoryError::conflict(
                "Vendor is used by existing comparisons",
            ));
        }

        Vendor::delete_by_id(existing.id).exec(self.db).await?;
        Ok(())
    }
}
