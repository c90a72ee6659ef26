//! Vendor entity model
//!
//! Suppliers that quote prices on comparison sheets.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vendors")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    pub contact_person: String,

    pub email: String,

    pub phone: String,

    pub address: String,

    /// VAT rate as a percentage (15.0 means 15%), never negative
    pub vat: f64,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comparison_vendor::Entity")]
    ComparisonVendor,
}

impl Related<super::comparison_vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComparisonVendor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
