//! # Vendor Handlers
//!
//! Every authenticated role may manage the vendor catalogue.

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
use crate::handlers::types::{
    IdPath, JsonBody, MessageResponse, non_blank, optional_non_blank, validate_vat,
};
use crate::models::vendor;
use crate::repositories::{
    VendorRepository,
    vendor::{NewVendor, VendorUpdate},
};
use crate::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorResponse {
    pub id: Uuid,
    #[schema(example = "Acme Supplies")]
    pub name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// VAT percentage
    #[schema(example = 15.0)]
    pub vat: f64,
    pub is_active: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<vendor::Model> for VendorResponse {
    fn from(model: vendor::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            contact_person: model.contact_person,
            email: model.email,
            phone: model.phone,
            address: model.address,
            vat: model.vat,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorRequest {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Defaults to 0 on create
    pub vat: Option<f64>,
    /// Defaults to true on create
    pub is_active: Option<bool>,
}

/// List vendors
#[utoipa::path(
    get,
    path = "/vendors",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Vendors ordered by name", body = [VendorResponse]),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "vendors"
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<VendorResponse>>, ApiError> {
    let vendors = VendorRepository::new(&state.db).list().await?;
    Ok(Json(vendors.into_iter().map(VendorResponse::from).collect()))
}

/// Create a vendor
#[utoipa::path(
    post,
    path = "/vendors",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = VendorRequest,
    responses(
        (status = 201, description = "Vendor created", body = VendorResponse),
        (status = 400, description = "Missing fields or negative VAT", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "vendors"
)]
pub async fn create_vendor(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): JsonBody<VendorRequest>,
) -> Result<(StatusCode, Json<VendorResponse>), ApiError> {
    let (Some(name), Some(contact_person), Some(email), Some(phone), Some(address)) = (
        non_blank(request.name),
        non_blank(request.contact_person),
        non_blank(request.email),
        non_blank(request.phone),
        non_blank(request.address),
    ) else {
        return Err(bad_request("All required fields must be provided"));
    };

    let vat = validate_vat(request.vat.unwrap_or(0.0), "VAT")?;

    let vendor = VendorRepository::new(&state.db)
        .create(NewVendor {
            name,
            contact_person,
            email,
            phone,
            address,
            vat,
            is_active: request.is_active.unwrap_or(true),
        })
        .await?;

    tracing::info!(vendor_id = %vendor.id, created_by = %auth.id(), "Vendor created");
    Ok((StatusCode::CREATED, Json(vendor.into())))
}

/// Get a vendor
#[utoipa::path(
    get,
    path = "/vendors/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Vendor", body = VendorResponse),
        (status = 404, description = "Vendor not found", body = ApiError)
    ),
    tag = "vendors"
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    _auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<VendorResponse>, ApiError> {
    let vendor = VendorRepository::new(&state.db).get(id).await?;
    Ok(Json(vendor.into()))
}

/// Update a vendor
#[utoipa::path(
    put,
    path = "/vendors/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Vendor id")),
    request_body = VendorRequest,
    responses(
        (status = 200, description = "Updated vendor", body = VendorResponse),
        (status = 400, description = "Blank field or negative VAT", body = ApiError),
        (status = 404, description = "Vendor not found", body = ApiError)
    ),
    tag = "vendors"
)]
pub async fn update_vendor(
    State(state): State<AppState>,
    _auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(request), _): JsonBody<VendorRequest>,
) -> Result<Json<VendorResponse>, ApiError> {
    let changes = VendorUpdate {
        name: optional_non_blank(request.name, "Name")?,
        contact_person: optional_non_blank(request.contact_person, "Contact person")?,
        email: optional_non_blank(request.email, "Email")?,
        phone: optional_non_blank(request.phone, "Phone")?,
        address: optional_non_blank(request.address, "Address")?,
        vat: request.vat.map(|v| validate_vat(v, "VAT")).transpose()?,
        is_active: request.is_active,
    };

    let vendor = VendorRepository::new(&state.db).update(id, changes).await?;
    Ok(Json(vendor.into()))
}

/// Delete a vendor
#[utoipa::path(
    delete,
    path = "/vendors/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Vendor id")),
    responses(
        (status = 200, description = "Vendor deleted", body = MessageResponse),
        (status = 400, description = "Vendor is quoted on a comparison", body = ApiError),
        (status = 404, description = "Vendor not found", body = ApiError)
    ),
    tag = "vendors"
)]
pub async fn delete_vendor(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    VendorRepository::new(&state.db).delete(id).await?;
    tracing::info!(vendor_id = %id, deleted_by = %auth.id(), "Vendor deleted");
    Ok(Json(MessageResponse::new("Vendor deleted successfully")))
}
