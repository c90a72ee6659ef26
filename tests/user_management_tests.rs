//! Integration tests for user account management rules

use axum::http::StatusCode;
use price_comparison::models::Role;
use serde_json::json;

#[path = "test_utils/mod.rs"]
mod test_utils;

use test_utils::TestApp;

#[tokio::test]
async fn checker_creates_makers_only() {
    let app = TestApp::new().await.unwrap();
    let checker = app.user("checker1", Role::Checker).await;
    let token = app.token(&checker);

    let (status, body) = app
        .post(
            "/users",
            &token,
            json!({"username": "maker9", "password": "longenough", "role": "maker", "name": "Maker Nine"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "maker");
    assert_eq!(body["isActive"], true);
    assert!(body.get("passwordHash").is_none());

    for role in ["checker", "admin"] {
        let (status, _) = app
            .post(
                "/users",
                &token,
                json!({"username": format!("new-{role}"), "password": "longenough", "role": role, "name": "X"}),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "checker creating {role}");
    }
}

#[tokio::test]
async fn short_password_is_rejected_before_role_rules() {
    let app = TestApp::new().await.unwrap();
    let checker = app.user("checker1", Role::Checker).await;

    let (status, body) = app
        .post(
            "/users",
            &app.token(&checker),
            json!({"username": "boss", "password": "short", "role": "admin", "name": "Boss"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Password must be at least 8 characters");
}

#[tokio::test]
async fn makers_cannot_manage_users() {
    let app = TestApp::new().await.unwrap();
    let maker = app.user("maker1", Role::Maker).await;
    let token = app.token(&maker);

    let (status, _) = app.get("/users", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/users",
            &token,
            json!({"username": "x", "password": "longenough", "role": "maker", "name": "X"}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_user_validates_input() {
    let app = TestApp::new().await.unwrap();
    let admin = app.user("admin1", Role::Admin).await;
    let token = app.token(&admin);

    let (status, body) = app
        .post("/users", &token, json!({"username": "x", "role": "maker"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");

    let (status, _) = app
        .post(
            "/users",
            &token,
            json!({"username": "x", "password": "short", "role": "maker", "name": "X"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/users",
            &token,
            json!({"username": "admin1", "password": "longenough", "role": "maker", "name": "X"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");
}

#[tokio::test]
async fn checker_lists_only_makers_and_admin_lists_everyone() {
    let app = TestApp::new().await.unwrap();
    let admin = app.user("admin1", Role::Admin).await;
    let checker = app.user("checker1", Role::Checker).await;
    app.user("maker1", Role::Maker).await;
    app.user("maker2", Role::Maker).await;

    let (status, body) = app.get("/users", &app.token(&checker)).await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u["role"] == "maker"));

    let (_, body) = app.get("/users", &app.token(&admin)).await;
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn maker_edits_only_own_name() {
    let app = TestApp::new().await.unwrap();
    let maker = app.user("maker1", Role::Maker).await;
    let other = app.user("maker2", Role::Maker).await;
    let token = app.token(&maker);

    let (status, body) = app
        .put(&format!("/users/{}", maker.id), &token, json!({"name": "New Name"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "New Name");

    let (status, _) = app
        .put(&format!("/users/{}", other.id), &token, json!({"name": "Hijack"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for body in [
        json!({"role": "admin"}),
        json!({"isActive": true}),
        json!({"username": "renamed"}),
    ] {
        let (status, _) = app
            .put(&format!("/users/{}", maker.id), &token, body.clone())
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "maker sending {body}");
    }

    let (status, _) = app.get(&format!("/users/{}", other.id), &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get(&format!("/users/{}", maker.id), &token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn nobody_can_deactivate_themselves() {
    let app = TestApp::new().await.unwrap();
    for (username, role) in [
        ("maker1", Role::Maker),
        ("checker1", Role::Checker),
        ("admin1", Role::Admin),
    ] {
        let user = app.user(username, role).await;
        let (status, body) = app
            .put(
                &format!("/users/{}", user.id),
                &app.token(&user),
                json!({"isActive": false}),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{username}");
        assert_eq!(body["error"], "Cannot deactivate your own account");
    }
}

#[tokio::test]
async fn checker_manages_makers_but_not_peers() {
    let app = TestApp::new().await.unwrap();
    let checker = app.user("checker1", Role::Checker).await;
    let peer = app.user("checker2", Role::Checker).await;
    let maker = app.user("maker1", Role::Maker).await;
    let token = app.token(&checker);

    let (status, body) = app
        .put(&format!("/users/{}", maker.id), &token, json!({"isActive": false}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isActive"], false);

    let (status, _) = app
        .put(&format!("/users/{}", maker.id), &token, json!({"role": "checker"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .put(&format!("/users/{}", peer.id), &token, json!({"name": "Peer"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn username_conflicts_on_rename_but_self_rename_is_fine() {
    let app = TestApp::new().await.unwrap();
    let admin = app.user("admin1", Role::Admin).await;
    let maker = app.user("maker1", Role::Maker).await;
    app.user("maker2", Role::Maker).await;
    let token = app.token(&admin);

    let (status, _) = app
        .put(&format!("/users/{}", maker.id), &token, json!({"username": "maker2"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(&format!("/users/{}", maker.id), &token, json!({"username": "maker1"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "maker1");

    let (status, _) = app
        .put(&format!("/users/{}", maker.id), &token, json!({"password": "short"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn only_admin_deletes_and_never_itself() {
    let app = TestApp::new().await.unwrap();
    let admin = app.user("admin1", Role::Admin).await;
    let checker = app.user("checker1", Role::Checker).await;
    let maker = app.user("maker1", Role::Maker).await;

    let (status, _) = app
        .delete(&format!("/users/{}", maker.id), &app.token(&checker))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let token = app.token(&admin);
    let (status, body) = app.delete(&format!("/users/{}", admin.id), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot delete your own account");

    let (status, body) = app.delete(&format!("/users/{}", maker.id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (status, _) = app.get(&format!("/users/{}", maker.id), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn users_with_comparisons_cannot_be_deleted() {
    let app = TestApp::new().await.unwrap();
    let admin = app.user("admin1", Role::Admin).await;
    let maker = app.user("maker1", Role::Maker).await;

    let (status, _) = app
        .post("/comparisons", &app.token(&maker), json!({"title": "Paper"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .delete(&format!("/users/{}", maker.id), &app.token(&admin))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("deactivate"));
}

#[tokio::test]
async fn malformed_id_is_a_json_bad_request() {
    let app = TestApp::new().await.unwrap();
    let admin = app.user("admin1", Role::Admin).await;

    let (status, body) = app.get("/users/not-a-uuid", &app.token(&admin)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid path parameter");
}
