//! # Attachment Repository
//!
//! Attachments are metadata only; the file itself lives wherever `file_url`
//! points.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{
    Attachment,
    attachment::{self, ActiveModel as AttachmentActiveModel, Model as AttachmentModel},
};

pub const ATTACHMENT_NOT_FOUND: &str = "Attachment not found";

#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub name: String,
    pub size: i64,
    pub mime_type: String,
    pub uploaded_by: Uuid,
    pub file_url: Option<String>,
    pub comparison_id: Option<Uuid>,
}

pub struct AttachmentRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AttachmentRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_for_comparison(
        &self,
        comparison_id: Uuid,
    ) -> Result<Vec<AttachmentModel>, RepositoryError> {
        Ok(Attachment::find()
            .filter(attachment::Column::ComparisonId.eq(comparison_id))
            .order_by_asc(attachment::Column::UploadedAt)
            .all(self.db)
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<AttachmentModel, RepositoryError> {
        Attachment::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| RepositoryError::not_found(ATTACHMENT_NOT_FOUND))
    }

    pub async fn create(
        &self,
        new_attachment: NewAttachment,
    ) -> Result<AttachmentModel, RepositoryError> {
        if new_attachment.size < 0 {
            return Err(RepositoryError::validation(
                "Attachment size cannot be negative",
            ));
        }

        let model = AttachmentActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_attachment.name),
            size: Set(new_attachment.size),
            mime_type: Set(new_attachment.mime_type),
            uploaded_at: Set(Utc::now().into()),
            uploaded_by: Set(new_attachment.uploaded_by),
            file_url: Set(new_attachment.file_url),
            comparison_id: Set(new_attachment.comparison_id),
        };
        Ok(model.insert(self.db).await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let result = Attachment::delete_by_id(id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::not_found(ATTACHMENT_NOT_FOUND));
        }
        Ok(())
    }
}
