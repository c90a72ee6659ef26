//! # API Handlers
//!
//! HTTP endpoint handlers for the price-comparison API, one module per
//! resource. The liveness and readiness endpoints live here.

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db;
use crate::error::{ApiError, ErrorType};
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod attachments;
pub mod auth;
pub mod comparisons;
pub mod items;
pub mod settings;
pub mod types;
pub mod users;
pub mod vendors;

/// Probe response body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
}

impl HealthResponse {
    fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Readiness check; pings the database
#[utoipa::path(
    get,
    path = "/readyz",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "health"
)]
pub async fn readyz(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthResponse>), ApiError> {
    if let Err(e) = db::health_check(&state.db).await {
        tracing::warn!(error = %e, "Readiness check failed");
        return Err(ErrorType::ServiceUnavailable.into());
    }
    Ok((StatusCode::OK, Json(HealthResponse::ok())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn root_reports_package_version() {
        let Json(info) = root().await;
        assert_eq!(info.service, "price-comparison");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn liveness_is_ok() {
        let Json(body) = healthz().await;
        assert_eq!(body.status, "ok");
    }
}
