//! # Comparison Handlers
//!
//! CRUD for price-comparison sheets plus the review workflow. Makers only
//! ever see their own comparisons; checkers and admins see all of them.
//! Status only changes through the submit, approve and reject endpoints.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, bad_request};
use crate::handlers::types::{IdPath, JsonBody, MessageResponse, json_or_default, non_blank};
use crate::handlers::vendors::VendorResponse;
use crate::lifecycle::{self, Transition};
use crate::models::{ComparisonStatus, Role, UnitOfMeasure, comparison, comparison_row};
use crate::permissions;
use crate::pricing::{self, QuotationSummary, QuotedRow, VendorColumn};
use crate::repositories::{
    ComparisonRepository, ItemRepository,
    comparison::{
        ComparisonChanges, ComparisonDetail, DEFAULT_TITLE, NewComparison, RowDraft,
        StatusChange, default_request_number,
    },
};
use crate::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResponse {
    pub id: Uuid,
    #[schema(example = "REQ-1700000000000")]
    pub request_number: String,
    #[schema(example = "Price Comparison")]
    pub title: String,
    pub status: ComparisonStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub submitted_at: Option<DateTime<FixedOffset>>,
    pub reviewed_at: Option<DateTime<FixedOffset>>,
    pub reviewed_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub general_comments: String,
    pub purpose: String,
}

impl From<comparison::Model> for ComparisonResponse {
    fn from(model: comparison::Model) -> Self {
        Self {
            id: model.id,
            request_number: model.request_number,
            title: model.title,
            status: model.status,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
            submitted_at: model.submitted_at,
            reviewed_at: model.reviewed_at,
            reviewed_by: model.reviewed_by,
            rejection_reason: model.rejection_reason,
            general_comments: model.general_comments,
            purpose: model.purpose,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RowResponse {
    pub id: Uuid,
    /// 1-based position of the row
    pub srl: i32,
    pub item_id: Uuid,
    pub description: String,
    pub qty: f64,
    pub uom: UnitOfMeasure,
    /// Quantity per vendor position
    pub quantities: Vec<f64>,
    /// Unit price per vendor position
    pub prices: Vec<f64>,
    /// 0-based index into `vendors`
    pub selected_vendor_index: Option<i32>,
    pub remarks: String,
    pub comment: String,
}

impl From<comparison_row::Model> for RowResponse {
    fn from(model: comparison_row::Model) -> Self {
        Self {
            quantities: comparison_row::decode_numbers(&model.quantities),
            prices: comparison_row::decode_numbers(&model.prices),
            id: model.id,
            srl: model.srl,
            item_id: model.item_id,
            description: model.description,
            qty: model.qty,
            uom: model.uom,
            selected_vendor_index: model.selected_vendor_index,
            remarks: model.remarks,
            comment: model.comment,
        }
    }
}

/// A comparison with its rows and its vendors in position order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonDetailResponse {
    #[serde(flatten)]
    pub comparison: ComparisonResponse,
    pub rows: Vec<RowResponse>,
    pub vendors: Vec<VendorResponse>,
}

impl From<ComparisonDetail> for ComparisonDetailResponse {
    fn from(detail: ComparisonDetail) -> Self {
        Self {
            comparison: detail.comparison.into(),
            rows: detail.rows.into_iter().map(RowResponse::from).collect(),
            vendors: detail
                .vendors
                .into_iter()
                .map(|linked| VendorResponse::from(linked.vendor))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RowRequest {
    /// Rows with a blank item id are ignored
    pub item_id: Option<String>,
    pub description: Option<String>,
    /// Defaults to `NOS`
    pub uom: Option<UnitOfMeasure>,
    pub quantities: Option<Vec<f64>>,
    pub prices: Option<Vec<f64>>,
    pub selected_vendor_index: Option<i32>,
    pub remarks: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    pub request_number: Option<String>,
    pub title: Option<String>,
    pub general_comments: Option<String>,
    pub purpose: Option<String>,
    /// Vendor ids in column order
    pub selected_vendors: Option<Vec<String>>,
    pub rows: Option<Vec<RowRequest>>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectRequest {
    #[serde(alias = "reason")]
    #[schema(example = "Quotes are out of date")]
    pub rejection_reason: Option<String>,
}

fn ensure_non_negative(values: &[f64], srl: usize, field: &str) -> Result<(), ApiError> {
    if values.iter().all(|v| v.is_finite() && *v >= 0.0) {
        Ok(())
    } else {
        Err(bad_request(format!(
            "Row {srl} {field} must be non-negative numbers"
        )))
    }
}

/// Drops rows without an item and turns the rest into drafts.
fn parse_rows(rows: Vec<RowRequest>) -> Result<Vec<RowDraft>, ApiError> {
    let mut drafts = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(raw_item_id) = non_blank(row.item_id) else {
            continue;
        };
        let srl = drafts.len() + 1;
        let item_id = Uuid::parse_str(&raw_item_id)
            .map_err(|_| bad_request("One or more items do not exist"))?;

        let quantities = row.quantities.unwrap_or_default();
        let prices = row.prices.unwrap_or_default();
        ensure_non_negative(&quantities, srl, "quantities")?;
        ensure_non_negative(&prices, srl, "prices")?;

        drafts.push(RowDraft {
            item_id,
            description: row.description.unwrap_or_default(),
            uom: row.uom.unwrap_or_default(),
            quantities,
            prices,
            selected_vendor_index: row.selected_vendor_index,
            remarks: row.remarks.unwrap_or_default(),
            comment: row.comment.unwrap_or_default(),
        });
    }
    Ok(drafts)
}

fn parse_vendor_ids(ids: Vec<String>) -> Result<Vec<Uuid>, ApiError> {
    ids.iter()
        .map(|id| {
            Uuid::parse_str(id.trim()).map_err(|_| bad_request("One or more vendors do not exist"))
        })
        .collect()
}

/// Loads a comparison the caller is allowed to see.
async fn load_visible(
    repo: &ComparisonRepository<'_>,
    auth: &AuthUser,
    id: Uuid,
) -> Result<comparison::Model, ApiError> {
    let comparison = repo.get(id).await?;
    permissions::authorize_comparison_access(auth.actor(), comparison.created_by)?;
    Ok(comparison)
}

/// List comparisons
#[utoipa::path(
    get,
    path = "/comparisons",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Comparisons, newest first; makers only see their own", body = [ComparisonResponse]),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "comparisons"
)]
pub async fn list_comparisons(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ComparisonResponse>>, ApiError> {
    let author = (auth.role() == Role::Maker).then_some(auth.id());
    let comparisons = ComparisonRepository::new(&state.db).list(author).await?;
    Ok(Json(
        comparisons
            .into_iter()
            .map(ComparisonResponse::from)
            .collect(),
    ))
}

/// Create a draft comparison
#[utoipa::path(
    post,
    path = "/comparisons",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = ComparisonRequest,
    responses(
        (status = 201, description = "Draft created", body = ComparisonDetailResponse),
        (status = 400, description = "Unknown item or vendor, or inconsistent rows", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "comparisons"
)]
pub async fn create_comparison(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): JsonBody<ComparisonRequest>,
) -> Result<(StatusCode, Json<ComparisonDetailResponse>), ApiError> {
    let rows = parse_rows(request.rows.unwrap_or_default())?;
    let vendor_ids = parse_vendor_ids(request.selected_vendors.unwrap_or_default())?;

    let detail = ComparisonRepository::new(&state.db)
        .create(NewComparison {
            request_number: non_blank(request.request_number)
                .unwrap_or_else(|| default_request_number(Utc::now())),
            title: non_blank(request.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            general_comments: request.general_comments.unwrap_or_default(),
            purpose: request.purpose.unwrap_or_default(),
            created_by: auth.id(),
            rows,
            vendor_ids,
        })
        .await?;

    tracing::info!(
        comparison_id = %detail.comparison.id,
        rows = detail.rows.len(),
        vendors = detail.vendors.len(),
        created_by = %auth.id(),
        "Comparison created"
    );
    Ok((StatusCode::CREATED, Json(detail.into())))
}

/// Get a comparison with rows and vendors
#[utoipa::path(
    get,
    path = "/comparisons/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Comparison id")),
    responses(
        (status = 200, description = "Comparison", body = ComparisonDetailResponse),
        (status = 403, description = "Comparison belongs to another maker", body = ApiError),
        (status = 404, description = "Comparison not found", body = ApiError)
    ),
    tag = "comparisons"
)]
pub async fn get_comparison(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<ComparisonDetailResponse>, ApiError> {
    let repo = ComparisonRepository::new(&state.db);
    let comparison = load_visible(&repo, &auth, id).await?;
    let detail = repo.detail(comparison).await?;
    Ok(Json(detail.into()))
}

/// Edit a draft comparison
///
/// Non-empty `rows` and `selectedVendors` replace the stored ones entirely;
/// empty arrays leave them untouched.
#[utoipa::path(
    put,
    path = "/comparisons/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Comparison id")),
    request_body = ComparisonRequest,
    responses(
        (status = 200, description = "Updated comparison", body = ComparisonDetailResponse),
        (status = 400, description = "Not a draft, or invalid rows or vendors", body = ApiError),
        (status = 403, description = "Comparison belongs to another maker", body = ApiError),
        (status = 404, description = "Comparison not found", body = ApiError)
    ),
    tag = "comparisons"
)]
pub async fn update_comparison(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(request), _): JsonBody<ComparisonRequest>,
) -> Result<Json<ComparisonDetailResponse>, ApiError> {
    let repo = ComparisonRepository::new(&state.db);
    let existing = load_visible(&repo, &auth, id).await?;
    lifecycle::ensure_editable(existing.status)?;

    let changes = ComparisonChanges {
        request_number: non_blank(request.request_number),
        title: non_blank(request.title),
        general_comments: request.general_comments,
        purpose: request.purpose,
        rows: request
            .rows
            .filter(|rows| !rows.is_empty())
            .map(parse_rows)
            .transpose()?,
        vendor_ids: request
            .selected_vendors
            .filter(|ids| !ids.is_empty())
            .map(parse_vendor_ids)
            .transpose()?,
    };

    let detail = repo.update(existing, changes).await?;
    tracing::info!(comparison_id = %id, updated_by = %auth.id(), "Comparison updated");
    Ok(Json(detail.into()))
}

/// Delete a comparison and everything it owns
#[utoipa::path(
    delete,
    path = "/comparisons/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Comparison id")),
    responses(
        (status = 200, description = "Comparison deleted", body = MessageResponse),
        (status = 400, description = "Only admins may delete non-draft comparisons", body = ApiError),
        (status = 403, description = "Comparison belongs to another maker", body = ApiError),
        (status = 404, description = "Comparison not found", body = ApiError)
    ),
    tag = "comparisons"
)]
pub async fn delete_comparison(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    let repo = ComparisonRepository::new(&state.db);
    let existing = load_visible(&repo, &auth, id).await?;
    lifecycle::ensure_deletable(existing.status, auth.role())?;

    repo.delete(id).await?;
    tracing::info!(comparison_id = %id, deleted_by = %auth.id(), "Comparison deleted");
    Ok(Json(MessageResponse::new("Comparison deleted successfully")))
}

/// Submit a draft for review
#[utoipa::path(
    post,
    path = "/comparisons/{id}/submit",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Comparison id")),
    responses(
        (status = 200, description = "Comparison submitted", body = ComparisonResponse),
        (status = 400, description = "Comparison is not a draft", body = ApiError),
        (status = 403, description = "Checkers cannot submit", body = ApiError),
        (status = 404, description = "Comparison not found", body = ApiError)
    ),
    tag = "comparisons"
)]
pub async fn submit_comparison(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<ComparisonResponse>, ApiError> {
    lifecycle::authorize_transition(auth.role(), Transition::Submit)?;

    let repo = ComparisonRepository::new(&state.db);
    let existing = load_visible(&repo, &auth, id).await?;
    lifecycle::apply(existing.status, Transition::Submit)?;

    let updated = repo.set_status(existing, StatusChange::Submitted).await?;
    tracing::info!(comparison_id = %id, submitted_by = %auth.id(), "Comparison submitted");
    Ok(Json(updated.into()))
}

/// Approve a submitted comparison
#[utoipa::path(
    post,
    path = "/comparisons/{id}/approve",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Comparison id")),
    responses(
        (status = 200, description = "Comparison approved", body = ComparisonResponse),
        (status = 400, description = "Comparison is not submitted", body = ApiError),
        (status = 403, description = "Makers cannot review", body = ApiError),
        (status = 404, description = "Comparison not found", body = ApiError)
    ),
    tag = "comparisons"
)]
pub async fn approve_comparison(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<ComparisonResponse>, ApiError> {
    lifecycle::authorize_transition(auth.role(), Transition::Approve)?;

    let repo = ComparisonRepository::new(&state.db);
    let existing = load_visible(&repo, &auth, id).await?;
    lifecycle::apply(existing.status, Transition::Approve)?;

    let updated = repo
        .set_status(existing, StatusChange::Approved { reviewer: auth.id() })
        .await?;
    tracing::info!(comparison_id = %id, reviewed_by = %auth.id(), "Comparison approved");
    Ok(Json(updated.into()))
}

/// Reject a submitted comparison
#[utoipa::path(
    post,
    path = "/comparisons/{id}/reject",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Comparison id")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Comparison rejected", body = ComparisonResponse),
        (status = 400, description = "Missing reason or comparison is not submitted", body = ApiError),
        (status = 403, description = "Makers cannot review", body = ApiError),
        (status = 404, description = "Comparison not found", body = ApiError)
    ),
    tag = "comparisons"
)]
pub async fn reject_comparison(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
    body: Bytes,
) -> Result<Json<ComparisonResponse>, ApiError> {
    lifecycle::authorize_transition(auth.role(), Transition::Reject)?;
    let request: RejectRequest = json_or_default(&body)?;
    let reason = lifecycle::rejection_reason(request.rejection_reason.as_deref())?;

    let repo = ComparisonRepository::new(&state.db);
    let existing = load_visible(&repo, &auth, id).await?;
    lifecycle::apply(existing.status, Transition::Reject)?;

    let updated = repo
        .set_status(
            existing,
            StatusChange::Rejected {
                reviewer: auth.id(),
                reason,
            },
        )
        .await?;
    tracing::info!(comparison_id = %id, reviewed_by = %auth.id(), "Comparison rejected");
    Ok(Json(updated.into()))
}

/// Vendor totals and lowest bidder
#[utoipa::path(
    get,
    path = "/comparisons/{id}/summary",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Comparison id")),
    responses(
        (status = 200, description = "Quotation summary", body = QuotationSummary),
        (status = 403, description = "Comparison belongs to another maker", body = ApiError),
        (status = 404, description = "Comparison not found", body = ApiError)
    ),
    tag = "comparisons"
)]
pub async fn comparison_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<QuotationSummary>, ApiError> {
    let repo = ComparisonRepository::new(&state.db);
    let comparison = load_visible(&repo, &auth, id).await?;
    let detail = repo.detail(comparison).await?;

    let item_ids: Vec<Uuid> = detail.rows.iter().map(|row| row.item_id).collect();
    let vat_applicable: HashMap<Uuid, bool> = ItemRepository::new(&state.db)
        .find_many(&item_ids)
        .await?
        .into_iter()
        .map(|item| (item.id, item.vat_applicable))
        .collect();

    let columns: Vec<VendorColumn> = detail
        .vendors
        .iter()
        .map(|linked| VendorColumn {
            position: linked.position,
            vendor_id: linked.vendor.id,
            vendor_name: linked.vendor.name.clone(),
            vat: linked.vendor.vat,
        })
        .collect();
    let rows: Vec<QuotedRow> = detail
        .rows
        .iter()
        .map(|row| QuotedRow {
            quantities: comparison_row::decode_numbers(&row.quantities),
            prices: comparison_row::decode_numbers(&row.prices),
            vat_applicable: vat_applicable.get(&row.item_id).copied().unwrap_or(true),
        })
        .collect();

    Ok(Json(pricing::summarize(&columns, &rows)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(item_id: &str) -> RowRequest {
        RowRequest {
            item_id: Some(item_id.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn rows_without_item_are_dropped() {
        let id = Uuid::new_v4();
        let drafts = parse_rows(vec![row("  "), row(&id.to_string()), RowRequest::default()])
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].item_id, id);
        assert_eq!(drafts[0].uom, UnitOfMeasure::default());
    }

    #[test]
    fn malformed_item_id_is_rejected() {
        let err = parse_rows(vec![row("not-a-uuid")]).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn negative_prices_are_rejected() {
        let mut request = row(&Uuid::new_v4().to_string());
        request.prices = Some(vec![10.0, -1.0]);
        let err = parse_rows(vec![request]).unwrap_err();
        assert!(err.message.contains("prices"));
    }

    #[test]
    fn vendor_ids_must_be_uuids() {
        let id = Uuid::new_v4();
        assert_eq!(parse_vendor_ids(vec![id.to_string()]).unwrap(), vec![id]);
        assert!(parse_vendor_ids(vec!["acme".to_string()]).is_err());
    }

    #[test]
    fn request_reads_selected_vendors() {
        let request: ComparisonRequest = serde_json::from_str(
            r#"{"title": "Paper", "selectedVendors": ["a"], "rows": [{"itemId": "b", "selectedVendorIndex": 0}], "status": "approved"}"#,
        )
        .unwrap();
        assert_eq!(request.selected_vendors, Some(vec!["a".to_string()]));
        let rows = request.rows.unwrap();
        assert_eq!(rows[0].selected_vendor_index, Some(0));
    }

    #[test]
    fn reject_accepts_both_reason_keys() {
        let full: RejectRequest =
            serde_json::from_str(r#"{"rejectionReason": "too high"}"#).unwrap();
        let short: RejectRequest = serde_json::from_str(r#"{"reason": "too high"}"#).unwrap();
        assert_eq!(full.rejection_reason.as_deref(), Some("too high"));
        assert_eq!(short.rejection_reason, full.rejection_reason);
    }
}
