//! # Common API Types
//!
//! Response shapes shared by several handlers and the extractor aliases
//! that turn axum rejections into [`ApiError`] bodies.

use axum::{body::Bytes, extract::Path, response::Json};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{ApiError, bad_request};
use crate::models::{Role, user};

/// `/{id}` path parameter with JSON rejections.
pub type IdPath = WithRejection<Path<Uuid>, ApiError>;

/// JSON request body with JSON rejections.
pub type JsonBody<T> = WithRejection<Json<T>, ApiError>;

/// Public view of a user; the password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "jdoe")]
    pub username: String,
    pub role: Role,
    #[schema(example = "Jane Doe")]
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<FixedOffset>,
    pub last_login: Option<DateTime<FixedOffset>>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role,
            name: model.name,
            is_active: model.is_active,
            created_at: model.created_at,
            last_login: model.last_login,
        }
    }
}

/// Confirmation body for deletes and logout.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Vendor deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Decodes a body read as raw bytes, for handlers that must run their
/// authorization checks before looking at the payload. An empty body yields
/// the default value.
pub fn json_or_default<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|error| bad_request(format!("Invalid JSON: {error}")))
}

/// Trims a supplied string and treats blank input as missing.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// For partial updates: a supplied field may not be blanked out.
pub fn optional_non_blank(
    value: Option<String>,
    field: &str,
) -> Result<Option<String>, ApiError> {
    match value {
        None => Ok(None),
        Some(v) => non_blank(Some(v))
            .map(Some)
            .ok_or_else(|| bad_request(format!("{field} cannot be empty"))),
    }
}

/// Rejects negative or non-finite VAT rates.
pub fn validate_vat(vat: f64, field: &str) -> Result<f64, ApiError> {
    if vat.is_finite() && vat >= 0.0 {
        Ok(vat)
    } else {
        Err(bad_request(format!("{field} must be a non-negative number")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_trims_and_drops_empty() {
        assert_eq!(non_blank(Some("  acme ".to_string())).as_deref(), Some("acme"));
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn optional_non_blank_rejects_blanking() {
        assert!(optional_non_blank(None, "Name").unwrap().is_none());
        assert_eq!(
            optional_non_blank(Some("x".to_string()), "Name").unwrap().as_deref(),
            Some("x")
        );
        let err = optional_non_blank(Some(" ".to_string()), "Name").unwrap_err();
        assert_eq!(err.message, Box::from("Name cannot be empty"));
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Note {
        text: Option<String>,
    }

    #[test]
    fn raw_body_decodes_or_defaults() {
        let empty: Note = json_or_default(&Bytes::new()).unwrap();
        assert_eq!(empty, Note::default());

        let note: Note = json_or_default(&Bytes::from_static(br#"{"text": "hi"}"#)).unwrap();
        assert_eq!(note.text.as_deref(), Some("hi"));

        let err = json_or_default::<Note>(&Bytes::from_static(b"{oops")).unwrap_err();
        assert!(err.message.starts_with("Invalid JSON"));
    }

    #[test]
    fn vat_must_be_non_negative() {
        assert_eq!(validate_vat(0.0, "VAT").unwrap(), 0.0);
        assert!(validate_vat(-1.0, "VAT").is_err());
        assert!(validate_vat(f64::NAN, "VAT").is_err());
    }
}
