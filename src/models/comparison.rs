//! Comparison entity model
//!
//! A price-comparison sheet. Its rows, vendor links and attachments are owned
//! exclusively by it and are removed together with it.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state of a comparison. See [`crate::lifecycle`] for the legal
/// transitions.
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ComparisonStatus {
    #[sea_orm(string_value = "draft")]
    #[default]
    Draft,

    #[sea_orm(string_value = "submitted")]
    Submitted,

    #[sea_orm(string_value = "approved")]
    Approved,

    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl ComparisonStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonStatus::Draft => "draft",
            ComparisonStatus::Submitted => "submitted",
            ComparisonStatus::Approved => "approved",
            ComparisonStatus::Rejected => "rejected",
        }
    }

    /// Approved and rejected comparisons accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, ComparisonStatus::Approved | ComparisonStatus::Rejected)
    }
}

impl std::fmt::Display for ComparisonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "comparisons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Human request number, `REQ-<epoch millis>` unless supplied
    pub request_number: String,

    pub title: String,

    pub status: ComparisonStatus,

    /// Owning user
    pub created_by: Uuid,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    pub submitted_at: Option<DateTimeWithTimeZone>,

    pub reviewed_at: Option<DateTimeWithTimeZone>,

    pub reviewed_by: Option<Uuid>,

    /// Present exactly when the status is `rejected`
    pub rejection_reason: Option<String>,

    pub general_comments: String,

    pub purpose: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comparison_row::Entity")]
    ComparisonRow,

    #[sea_orm(has_many = "super::comparison_vendor::Entity")]
    ComparisonVendor,

    #[sea_orm(has_many = "super::attachment::Entity")]
    Attachment,
}

impl Related<super::comparison_row::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComparisonRow.def()
    }
}

impl Related<super::comparison_vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComparisonVendor.def()
    }
}

impl Related<super::attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
