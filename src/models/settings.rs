//! Settings entity model
//!
//! Company-wide settings. A single row is used; it is created with
//! [`defaults`] the first time it is read.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

pub const DEFAULT_COMPANY_NAME: &str = "Your Company Name";
pub const DEFAULT_COMPANY_ADDRESS: &str = "Your Company Address";
pub const DEFAULT_COMPANY_PHONE: &str = "+1234567890";
pub const DEFAULT_COMPANY_EMAIL: &str = "info@company.com";
pub const DEFAULT_VAT: f64 = 15.0;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub company_name: String,

    pub company_address: String,

    pub company_phone: String,

    pub company_email: String,

    /// Default VAT percentage offered for new vendors
    pub default_vat: f64,

    /// Signature image (data URL) printed on approved sheets
    pub checker_signature: Option<String>,

    pub updated_at: DateTimeWithTimeZone,

    pub updated_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Active model for a fresh settings row holding the default values.
pub fn defaults(now: DateTimeWithTimeZone) -> ActiveModel {
    use sea_orm::Set;

    ActiveModel {
        id: Set(Uuid::new_v4()),
        company_name: Set(DEFAULT_COMPANY_NAME.to_string()),
        company_address: Set(DEFAULT_COMPANY_ADDRESS.to_string()),
        company_phone: Set(DEFAULT_COMPANY_PHONE.to_string()),
        company_email: Set(DEFAULT_COMPANY_EMAIL.to_string()),
        default_vat: Set(DEFAULT_VAT),
        checker_signature: Set(None),
        updated_at: Set(now),
        updated_by: Set(None),
    }
}
