//! # Item Handlers

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
use crate::handlers::types::{IdPath, JsonBody, MessageResponse, non_blank, optional_non_blank};
use crate::models::{UnitOfMeasure, item};
use crate::repositories::{
    ItemRepository,
    item::{ItemUpdate, NewItem},
};
use crate::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: Uuid,
    #[schema(example = "A4 paper")]
    pub name: String,
    pub description: String,
    pub specification: String,
    pub unit: UnitOfMeasure,
    pub category: String,
    pub vat_applicable: bool,
    pub is_active: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<item::Model> for ItemResponse {
    fn from(model: item::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            specification: model.specification,
            unit: model.unit,
            category: model.category,
            vat_applicable: model.vat_applicable,
            is_active: model.is_active,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub specification: Option<String>,
    pub unit: Option<UnitOfMeasure>,
    pub category: Option<String>,
    /// Defaults to true on create
    pub vat_applicable: Option<bool>,
    /// Defaults to true on create
    pub is_active: Option<bool>,
}

/// List items
#[utoipa::path(
    get,
    path = "/items",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Items ordered by name", body = [ItemResponse]),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<ItemResponse>>, ApiError> {
    let items = ItemRepository::new(&state.db).list().await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

/// Create an item
#[utoipa::path(
    post,
    path = "/items",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = ItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Missing fields", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): JsonBody<ItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError> {
    let (Some(name), Some(description), Some(specification), Some(unit), Some(category)) = (
        non_blank(request.name),
        non_blank(request.description),
        non_blank(request.specification),
        request.unit,
        non_blank(request.category),
    ) else {
        return Err(bad_request("All required fields must be provided"));
    };

    let item = ItemRepository::new(&state.db)
        .create(NewItem {
            name,
            description,
            specification,
            unit,
            category,
            vat_applicable: request.vat_applicable.unwrap_or(true),
            is_active: request.is_active.unwrap_or(true),
        })
        .await?;

    tracing::info!(item_id = %item.id, created_by = %auth.id(), "Item created");
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// Get an item
#[utoipa::path(
    get,
    path = "/items/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item", body = ItemResponse),
        (status = 404, description = "Item not found", body = ApiError)
    ),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    _auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<ItemResponse>, ApiError> {
    let item = ItemRepository::new(&state.db).get(id).await?;
    Ok(Json(item.into()))
}

/// Update an item
#[utoipa::path(
    put,
    path = "/items/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Item id")),
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Updated item", body = ItemResponse),
        (status = 400, description = "Blank field", body = ApiError),
        (status = 404, description = "Item not found", body = ApiError)
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    _auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Json(request), _): JsonBody<ItemRequest>,
) -> Result<Json<ItemResponse>, ApiError> {
    let changes = ItemUpdate {
        name: optional_non_blank(request.name, "Name")?,
        description: optional_non_blank(request.description, "Description")?,
        specification: optional_non_blank(request.specification, "Specification")?,
        unit: request.unit,
        category: optional_non_blank(request.category, "Category")?,
        vat_applicable: request.vat_applicable,
        is_active: request.is_active,
    };

    let item = ItemRepository::new(&state.db).update(id, changes).await?;
    Ok(Json(item.into()))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/items/{id}",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    params(("id" = Uuid, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 400, description = "Item appears on a comparison", body = ApiError),
        (status = 404, description = "Item not found", body = ApiError)
    ),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Path(id), _): IdPath,
) -> Result<Json<MessageResponse>, ApiError> {
    ItemRepository::new(&state.db).delete(id).await?;
    tracing::info!(item_id = %id, deleted_by = %auth.id(), "Item deleted");
    Ok(Json(MessageResponse::new("Item deleted successfully")))
}
