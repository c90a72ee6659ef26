//! User entity model
//!
//! Accounts that sign in to the service. The role column drives every
//! authorization decision made in [`crate::permissions`].

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role held by a user.
///
/// Variants are declared lowest privilege first so that the derived `Ord`
/// reflects the hierarchy `Maker < Checker < Admin`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "maker")]
    Maker,

    #[sea_orm(string_value = "checker")]
    Checker,

    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    /// Numeric privilege level (maker 1, checker 2, admin 3).
    pub fn level(self) -> u8 {
        match self {
            Role::Maker => 1,
            Role::Checker => 2,
            Role::Admin => 3,
        }
    }

    /// Whether this role may review (approve or reject) comparisons and see
    /// every comparison in the system.
    pub fn is_reviewer(self) -> bool {
        self >= Role::Checker
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Maker => "maker",
            Role::Checker => "checker",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Login name, unique and case-sensitive
    #[sea_orm(unique)]
    pub username: String,

    /// Argon2id PHC string; never leaves the repository layer
    pub password_hash: String,

    pub role: Role,

    /// Display name
    pub name: String,

    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub last_login: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attachment::Entity")]
    Attachment,
}

impl Related<super::attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
