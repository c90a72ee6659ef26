//! Attachment entity model
//!
//! Metadata for a file stored outside the service.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "attachments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Original file name
    pub name: String,

    /// Size in bytes
    pub size: i64,

    pub mime_type: String,

    pub uploaded_at: DateTimeWithTimeZone,

    pub uploaded_by: Uuid,

    pub file_url: Option<String>,

    pub comparison_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::comparison::Entity",
        from = "Column::ComparisonId",
        to = "super::comparison::Column::Id",
        on_delete = "Cascade"
    )]
    Comparison,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UploadedBy",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::comparison::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comparison.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
