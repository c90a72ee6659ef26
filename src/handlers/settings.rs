//! # Settings Handlers
//!
//! Company-wide settings. Any signed-in user may read them; checkers and
//! admins may change them.

use axum::{extract::State, response::Json};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::types::{JsonBody, optional_non_blank, validate_vat};
use crate::models::settings;
use crate::permissions;
use crate::repositories::{SettingsRepository, settings::SettingsUpdate};
use crate::server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub id: Uuid,
    #[schema(example = "Your Company Name")]
    pub company_name: String,
    pub company_address: String,
    pub company_phone: String,
    pub company_email: String,
    /// VAT percentage suggested for new vendors
    #[schema(example = 15.0)]
    pub default_vat: f64,
    pub checker_signature: Option<String>,
    pub updated_at: DateTime<FixedOffset>,
    pub updated_by: Option<Uuid>,
}

impl From<settings::Model> for SettingsResponse {
    fn from(model: settings::Model) -> Self {
        Self {
            id: model.id,
            company_name: model.company_name,
            company_address: model.company_address,
            company_phone: model.company_phone,
            company_email: model.company_email,
            default_vat: model.default_vat,
            checker_signature: model.checker_signature,
            updated_at: model.updated_at,
            updated_by: model.updated_by,
        }
    }
}

/// Distinguishes an explicit `null` from an absent field.
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub company_phone: Option<String>,
    pub company_email: Option<String>,
    pub default_vat: Option<f64>,
    /// `null` removes the stored signature
    #[serde(default, deserialize_with = "explicit_null")]
    #[schema(value_type = Option<String>)]
    pub checker_signature: Option<Option<String>>,
}

/// Current settings
#[utoipa::path(
    get,
    path = "/settings",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Settings; defaults are stored on first read", body = SettingsResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError)
    ),
    tag = "settings"
)]
pub async fn get_settings(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<SettingsResponse>, ApiError> {
    let settings = SettingsRepository::new(&state.db).get_or_create().await?;
    Ok(Json(settings.into()))
}

/// Update settings
#[utoipa::path(
    put,
    path = "/settings",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Updated settings", body = SettingsResponse),
        (status = 400, description = "Blank field or negative VAT", body = ApiError),
        (status = 403, description = "Makers cannot change settings", body = ApiError)
    ),
    tag = "settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(request), _): JsonBody<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, ApiError> {
    permissions::authorize_settings_update(auth.role())?;

    let changes = SettingsUpdate {
        company_name: optional_non_blank(request.company_name, "Company name")?,
        company_address: optional_non_blank(request.company_address, "Company address")?,
        company_phone: optional_non_blank(request.company_phone, "Company phone")?,
        company_email: optional_non_blank(request.company_email, "Company email")?,
        default_vat: request
            .default_vat
            .map(|vat| validate_vat(vat, "Default VAT"))
            .transpose()?,
        checker_signature: request.checker_signature,
    };

    let settings = SettingsRepository::new(&state.db)
        .update(changes, auth.id())
        .await?;
    tracing::info!(updated_by = %auth.id(), "Settings updated");
    Ok(Json(settings.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_null_differs_from_absent() {
        let cleared: UpdateSettingsRequest =
            serde_json::from_str(r#"{"checkerSignature": null}"#).unwrap();
        assert_eq!(cleared.checker_signature, Some(None));

        let untouched: UpdateSettingsRequest =
            serde_json::from_str(r#"{"companyName": "Acme"}"#).unwrap();
        assert_eq!(untouched.checker_signature, None);
        assert_eq!(untouched.company_name.as_deref(), Some("Acme"));
    }
}
