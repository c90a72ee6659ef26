//! # Attachment Handlers
//!
//! Attachments are metadata records; the file itself is stored elsewhere and
//! referenced by `fileUrl`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, bad_request};
use crate::handlers::types::{IdPath, JsonBody, MessageResponse, non_blank};
use crate::models::attachment;
use crate::permissions;
use crate::repositories::{
    AttachmentRepository, ComparisonRepository, attachment::NewAttachment,
};
use crate::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub id: Uuid,
    #[schema(example = "quote-acme.pdf")]
    pub name: String,
    /// Size in bytes
    pub size: i64,
    /// MIME type
    #[serde(rename = "type")]
    #[schema(example = "application/pdf")]
    pub mime_type: String,
    pub uploaded_at: DateTime<FixedOffset>,
    pub uploaded_by: Uuid,
    pub file_url: Option<String>,
    pub comparison_id: Option<Uuid>,
}

impl From<attachment::Model> for AttachmentResponse {
    fn from(model: attachment::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            size: model.size,
            mime_type: model.mime_type,
            uploaded_at: model.uploaded_at,
            uploaded_by: model.uploaded_by,
            file_url: model.file_url,
            comparison_id: model.comparison_id,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRequest {
    pub name: Option<String>,
    /// Size in bytes, defaults to 0
    pub size: Option<i64>,
    /// MIME type
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub file_url: Option<String>,
}

/// List a comparison's attachments
#[utoipa::path(
    get,
    path = "/comparisons/{id}/attachments",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Comparison id")),
    responses(
        (status = 200, description = "Attachments, oldest first", body = [AttachmentResponse]),
        (status = 403, description = "Comparison belongs to another maker", body = ApiError),
        (status = 404, description = "Comparison not found", body = ApiError)
    ),
    tag = "attachments"
)]
pub async fn list_attachments(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<Vec<AttachmentResponse>>, ApiError> {
    let comparison = ComparisonRepository::new(&state.db).get(id).await?;
    permissions::authorize_comparison_access(auth.actor(), comparison.created_by)?;

    let attachments = AttachmentRepository::new(&state.db)
        .list_for_comparison(id)
        .await?;
    Ok(Json(
        attachments
            .into_iter()
            .map(AttachmentResponse::from)
            .collect(),
    ))
}

/// Record an attachment on a comparison
#[utoipa::path(
    post,
    path = "/comparisons/{id}/attachments",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Comparison id")),
    request_body = AttachmentRequest,
    responses(
        (status = 201, description = "Attachment recorded", body = AttachmentResponse),
        (status = 400, description = "Missing name or type, or negative size", body = ApiError),
        (status = 403, description = "Comparison belongs to another maker", body = ApiError),
        (status = 404, description = "Comparison not found", body = ApiError)
    ),
    tag = "attachments"
)]
pub async fn create_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(request), _): JsonBody<AttachmentRequest>,
) -> Result<(StatusCode, Json<AttachmentResponse>), ApiError> {
    let comparison = ComparisonRepository::new(&state.db).get(id).await?;
    permissions::authorize_comparison_access(auth.actor(), comparison.created_by)?;

    let (Some(name), Some(mime_type)) = (non_blank(request.name), non_blank(request.mime_type))
    else {
        return Err(bad_request("All required fields must be provided"));
    };

    let attachment = AttachmentRepository::new(&state.db)
        .create(NewAttachment {
            name,
            size: request.size.unwrap_or(0),
            mime_type,
            uploaded_by: auth.id(),
            file_url: non_blank(request.file_url),
            comparison_id: Some(comparison.id),
        })
        .await?;

    tracing::info!(
        attachment_id = %attachment.id,
        comparison_id = %id,
        uploaded_by = %auth.id(),
        "Attachment recorded"
    );
    Ok((StatusCode::CREATED, Json(attachment.into())))
}

/// Delete an attachment
#[utoipa::path(
    delete,
    path = "/attachments/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Attachment id")),
    responses(
        (status = 200, description = "Attachment deleted", body = MessageResponse),
        (status = 403, description = "Not allowed to remove this attachment", body = ApiError),
        (status = 404, description = "Attachment not found", body = ApiError)
    ),
    tag = "attachments"
)]
pub async fn delete_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = AttachmentRepository::new(&state.db);
    let attachment = repo.get(id).await?;

    // Detached files belong to whoever uploaded them.
    let owner = match attachment.comparison_id {
        Some(comparison_id) => {
            ComparisonRepository::new(&state.db)
                .get(comparison_id)
                .await?
                .created_by
        }
        None => attachment.uploaded_by,
    };
    permissions::authorize_comparison_access(auth.actor(), owner)?;

    repo.delete(id).await?;
    tracing::info!(attachment_id = %id, deleted_by = %auth.id(), "Attachment deleted");
    Ok(Json(MessageResponse::new("Attachment deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_travels_as_type() {
        let request: AttachmentRequest =
            serde_json::from_str(r#"{"name": "a.pdf", "type": "application/pdf", "size": 12}"#)
                .unwrap();
        assert_eq!(request.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(request.size, Some(12));
    }
}
