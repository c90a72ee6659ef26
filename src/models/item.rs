//! Item entity model
//!
//! Catalog entries referenced by comparison rows.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Unit of measure short codes accepted for items and comparison rows.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitOfMeasure {
    /// Numbers
    #[sea_orm(string_value = "NOS")]
    #[default]
    Nos,

    /// Pieces
    #[sea_orm(string_value = "PCS")]
    Pcs,

    #[sea_orm(string_value = "SET")]
    Set,

    /// Kilograms
    #[sea_orm(string_value = "KG")]
    Kg,

    /// Metres
    #[sea_orm(string_value = "M")]
    M,

    /// Litres
    #[sea_orm(string_value = "L")]
    L,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    pub description: String,

    pub specification: String,

    pub unit: UnitOfMeasure,

    pub category: String,

    /// Whether vendor VAT applies to this item
    pub vat_applicable: bool,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comparison_row::Entity")]
    ComparisonRow,
}

impl Related<super::comparison_row::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComparisonRow.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
