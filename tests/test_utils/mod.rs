//! Test utilities for driving the API.
//!
//! Each test gets its own in-memory SQLite database with all migrations
//! applied, and a router built exactly as the server builds it.

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use price_comparison::{
    config::AppConfig,
    db,
    models::{Role, user},
    password,
    repositories::{UserRepository, user::NewUser},
    server::{AppState, create_app},
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tokio::sync::OnceCell;
use tower::ServiceExt;

/// Password shared by every fixture user.
#[allow(dead_code)]
pub const TEST_PASSWORD: &str = "password123";

pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret-that-is-at-least-32-bytes".to_string(),
        admin_password: Some("admin-password".to_string()),
        ..Default::default()
    }
}

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = db::init_pool(&test_config()).await?;
    db::run_migrations(&db).await?;
    Ok(db)
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        let db = setup_test_db().await?;
        let state = AppState::new(test_config(), db);
        let router = create_app(state.clone());
        Ok(Self { state, router })
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    /// Inserts an active user whose password is [`TEST_PASSWORD`].
    pub async fn user(&self, username: &str, role: Role) -> user::Model {
        UserRepository::new(self.db())
            .create(NewUser {
                username: username.to_string(),
                password_hash: test_password_hash().await,
                role,
                name: format!("{username} name"),
                is_active: true,
            })
            .await
            .expect("fixture user is created")
    }

    pub fn token(&self, user: &user::Model) -> String {
        self.state.jwt.issue(user).expect("token is issued")
    }

    /// Sends one request through the router and decodes the JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request builds");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router responds");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    #[allow(dead_code)]
    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    #[allow(dead_code)]
    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    #[allow(dead_code)]
    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    #[allow(dead_code)]
    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }
}

/// Argon2 is slow in debug builds, so fixtures share one hash.
async fn test_password_hash() -> String {
    static HASH: OnceCell<String> = OnceCell::const_new();
    HASH.get_or_init(|| async {
        password::hash_password(TEST_PASSWORD.to_string())
            .await
            .expect("test password hashes")
    })
    .await
    .clone()
}
