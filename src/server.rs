//! # Server Configuration
//!
//! Router assembly, shared state and the OpenAPI document for the
//! price-comparison API.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{self, JwtKeys, TOKEN_COOKIE};
use crate::config::AppConfig;
use crate::error::{ApiError, ErrorType};
use crate::handlers;
use crate::telemetry::{TRACE_ID_HEADER, trace_id_middleware};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection) -> Self {
        let jwt = JwtKeys::from_config(&config);
        Self {
            config: Arc::new(config),
            db,
            jwt: Arc::new(jwt),
        }
    }
}

async fn route_not_found() -> ApiError {
    ErrorType::NotFound.into()
}

async fn method_not_allowed() -> ApiError {
    ErrorType::MethodNotAllowed.into()
}

/// Cross-origin access for a browser front end on another origin.
fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    let origin = config.cors_allowed_origin.as_deref()?;
    match HeaderValue::from_str(origin) {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE, TRACE_ID_HEADER])
                .expose_headers([TRACE_ID_HEADER]),
        ),
        Err(error) => {
            tracing::warn!(%error, origin, "Ignoring invalid CORS origin");
            None
        }
    }
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let public = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout));

    let protected = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/verify", get(handlers::auth::verify))
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route(
            "/vendors",
            get(handlers::vendors::list_vendors).post(handlers::vendors::create_vendor),
        )
        .route(
            "/vendors/{id}",
            get(handlers::vendors::get_vendor)
                .put(handlers::vendors::update_vendor)
                .delete(handlers::vendors::delete_vendor),
        )
        .route(
            "/items",
            get(handlers::items::list_items).post(handlers::items::create_item),
        )
        .route(
            "/items/{id}",
            get(handlers::items::get_item)
                .put(handlers::items::update_item)
                .delete(handlers::items::delete_item),
        )
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route(
            "/comparisons",
            get(handlers::comparisons::list_comparisons)
                .post(handlers::comparisons::create_comparison),
        )
        .route(
            "/comparisons/{id}",
            get(handlers::comparisons::get_comparison)
                .put(handlers::comparisons::update_comparison)
                .delete(handlers::comparisons::delete_comparison),
        )
        .route(
            "/comparisons/{id}/submit",
            post(handlers::comparisons::submit_comparison),
        )
        .route(
            "/comparisons/{id}/approve",
            post(handlers::comparisons::approve_comparison),
        )
        .route(
            "/comparisons/{id}/reject",
            post(handlers::comparisons::reject_comparison),
        )
        .route(
            "/comparisons/{id}/summary",
            get(handlers::comparisons::comparison_summary),
        )
        .route(
            "/comparisons/{id}/attachments",
            get(handlers::attachments::list_attachments)
                .post(handlers::attachments::create_attachment),
        )
        .route(
            "/attachments/{id}",
            delete(handlers::attachments::delete_attachment),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let cors = cors_layer(&state.config);

    let mut app = public
        .merge(protected)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors {
        app = app.layer(cors);
    }

    app.layer(middleware::from_fn(trace_id_middleware))
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .with_context(|| format!("Invalid server address: {}", config.api_bind_addr))?;
    let profile = config.profile.clone();

    let app = create_app(AppState::new(config, db));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

/// Registers the bearer and cookie session schemes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                TOKEN_COOKIE,
                "Session cookie set by POST /auth/login",
            ))),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        crate::handlers::root,
        crate::handlers::healthz,
        crate::handlers::readyz,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::auth::me,
        crate::handlers::auth::verify,
        crate::handlers::users::list_users,
        crate::handlers::users::create_user,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::vendors::list_vendors,
        crate::handlers::vendors::create_vendor,
        crate::handlers::vendors::get_vendor,
        crate::handlers::vendors::update_vendor,
        crate::handlers::vendors::delete_vendor,
        crate::handlers::items::list_items,
        crate::handlers::items::create_item,
        crate::handlers::items::get_item,
        crate::handlers::items::update_item,
        crate::handlers::items::delete_item,
        crate::handlers::settings::get_settings,
        crate::handlers::settings::update_settings,
        crate::handlers::comparisons::list_comparisons,
        crate::handlers::comparisons::create_comparison,
        crate::handlers::comparisons::get_comparison,
        crate::handlers::comparisons::update_comparison,
        crate::handlers::comparisons::delete_comparison,
        crate::handlers::comparisons::submit_comparison,
        crate::handlers::comparisons::approve_comparison,
        crate::handlers::comparisons::reject_comparison,
        crate::handlers::comparisons::comparison_summary,
        crate::handlers::attachments::list_attachments,
        crate::handlers::attachments::create_attachment,
        crate::handlers::attachments::delete_attachment,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::Role,
            crate::models::ComparisonStatus,
            crate::models::UnitOfMeasure,
            crate::error::ApiError,
            crate::auth::Claims,
            crate::handlers::HealthResponse,
            crate::handlers::types::UserResponse,
            crate::handlers::types::MessageResponse,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,
            crate::handlers::auth::MeResponse,
            crate::handlers::auth::VerifyResponse,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::users::UpdateUserRequest,
            crate::handlers::vendors::VendorRequest,
            crate::handlers::vendors::VendorResponse,
            crate::handlers::items::ItemRequest,
            crate::handlers::items::ItemResponse,
            crate::handlers::settings::SettingsResponse,
            crate::handlers::settings::UpdateSettingsRequest,
            crate::handlers::comparisons::ComparisonRequest,
            crate::handlers::comparisons::RowRequest,
            crate::handlers::comparisons::RejectRequest,
            crate::handlers::comparisons::ComparisonResponse,
            crate::handlers::comparisons::RowResponse,
            crate::handlers::comparisons::ComparisonDetailResponse,
            crate::handlers::attachments::AttachmentRequest,
            crate::handlers::attachments::AttachmentResponse,
            crate::pricing::QuotationSummary,
            crate::pricing::VendorTotal,
        )
    ),
    tags(
        (name = "auth", description = "Sessions"),
        (name = "users", description = "User accounts"),
        (name = "vendors", description = "Vendor catalogue"),
        (name = "items", description = "Item catalogue"),
        (name = "comparisons", description = "Price comparisons and their review"),
        (name = "attachments", description = "Comparison attachment metadata"),
        (name = "settings", description = "Company settings"),
        (name = "health", description = "Probes")
    ),
    info(
        title = "Price Comparison API",
        description = "Procurement price comparisons with maker/checker review",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
