//! Integration tests for vendors, items, attachments and company settings

use axum::http::StatusCode;
use price_comparison::models::Role;
use serde_json::json;
use uuid::Uuid;

#[path = "test_utils/mod.rs"]
mod test_utils;

use test_utils::TestApp;

fn acme() -> serde_json::Value {
    json!({
        "name": "Acme Supplies",
        "contactPerson": "Jo",
        "email": "sales@acme.test",
        "phone": "555-0101",
        "address": "2 Dock Rd"
    })
}

#[tokio::test]
async fn vendor_crud() {
    let app = TestApp::new().await.unwrap();
    let maker = app.user("maker1", Role::Maker).await;
    let token = app.token(&maker);

    let (status, created) = app.post("/vendors", &token, acme()).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["vat"], 0.0);
    assert_eq!(created["isActive"], true);
    let id = created["id"].as_str().unwrap();

    let (status, updated) = app
        .put(&format!("/vendors/{id}"), &token, json!({"vat": 7.5, "isActive": false}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["vat"], 7.5);
    assert_eq!(updated["isActive"], false);
    assert_eq!(updated["name"], "Acme Supplies");

    let (_, listed) = app.get("/vendors", &token).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, body) = app.delete(&format!("/vendors/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Vendor deleted successfully");

    let (status, _) = app.get(&format!("/vendors/{id}"), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vendor_validation() {
    let app = TestApp::new().await.unwrap();
    let maker = app.user("maker1", Role::Maker).await;
    let token = app.token(&maker);

    let (status, body) = app
        .post("/vendors", &token, json!({"name": "Half", "email": "a@b.test"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All required fields must be provided");

    let mut negative = acme();
    negative["vat"] = json!(-5);
    let (status, _) = app.post("/vendors", &token, negative).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, created) = app.post("/vendors", &token, acme()).await;
    let id = created["id"].as_str().unwrap();
    let (status, _) = app
        .put(&format!("/vendors/{id}"), &token, json!({"name": "  "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn vendors_in_use_cannot_be_deleted() {
    let app = TestApp::new().await.unwrap();
    let maker = app.user("maker1", Role::Maker).await;
    let token = app.token(&maker);

    let (_, vendor) = app.post("/vendors", &token, acme()).await;
    let vendor_id = vendor["id"].as_str().unwrap();
    let (status, _) = app
        .post("/comparisons", &token, json!({"selectedVendors": [vendor_id]}))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.delete(&format!("/vendors/{vendor_id}"), &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Vendor is used by existing comparisons");
}

#[tokio::test]
async fn item_crud_and_defaults() {
    let app = TestApp::new().await.unwrap();
    let checker = app.user("checker1", Role::Checker).await;
    let token = app.token(&checker);

    let (status, body) = app.post("/items", &token, json!({"name": "Paper"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All required fields must be provided");

    let (status, created) = app
        .post(
            "/items",
            &token,
            json!({
                "name": "Paper",
                "description": "A4 80gsm",
                "specification": "500 sheets",
                "unit": "SET",
                "category": "Stationery"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["vatApplicable"], true);
    assert_eq!(created["isActive"], true);
    assert_eq!(created["unit"], "SET");

    let id = created["id"].as_str().unwrap();
    let (status, updated) = app
        .put(&format!("/items/{id}"), &token, json!({"vatApplicable": false}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["vatApplicable"], false);
    assert_eq!(updated["category"], "Stationery");

    let (status, body) = app.delete(&format!("/items/{id}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item deleted successfully");

    let (status, _) = app
        .put(&format!("/items/{}", Uuid::new_v4()), &token, json!({"name": "Ghost"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn attachments_follow_comparison_access() {
    let app = TestApp::new().await.unwrap();
    let owner = app.user("maker1", Role::Maker).await;
    let stranger = app.user("maker2", Role::Maker).await;
    let checker = app.user("checker1", Role::Checker).await;
    let owner_token = app.token(&owner);
    let stranger_token = app.token(&stranger);

    let (_, comparison) = app.post("/comparisons", &owner_token, json!({})).await;
    let comparison_id = comparison["id"].as_str().unwrap();
    let uri = format!("/comparisons/{comparison_id}/attachments");

    let (status, body) = app.post(&uri, &owner_token, json!({"name": "quote.pdf"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All required fields must be provided");

    let (status, created) = app
        .post(
            &uri,
            &owner_token,
            json!({"name": "quote.pdf", "type": "application/pdf", "fileUrl": "https://files.test/q.pdf"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "application/pdf");
    assert_eq!(created["size"], 0);
    assert_eq!(created["uploadedBy"], owner.id.to_string());
    assert_eq!(created["comparisonId"], comparison_id);
    let attachment_id = created["id"].as_str().unwrap();

    let (status, _) = app.get(&uri, &stranger_token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .post(&uri, &stranger_token, json!({"name": "x", "type": "text/plain"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .delete(&format!("/attachments/{attachment_id}"), &stranger_token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, listed) = app.get(&uri, &app.token(&checker)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, body) = app
        .delete(&format!("/attachments/{attachment_id}"), &owner_token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Attachment deleted successfully");

    let (_, listed) = app.get(&uri, &owner_token).await;
    assert!(listed.as_array().unwrap().is_empty());

    let (status, _) = app
        .post(
            &format!("/comparisons/{}/attachments", Uuid::new_v4()),
            &owner_token,
            json!({"name": "x", "type": "text/plain"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn settings_are_created_with_defaults() {
    let app = TestApp::new().await.unwrap();
    let maker = app.user("maker1", Role::Maker).await;

    let (status, settings) = app.get("/settings", &app.token(&maker)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["companyName"], "Your Company Name");
    assert_eq!(settings["defaultVat"], 15.0);
    assert!(settings["checkerSignature"].is_null());
    assert!(settings["updatedBy"].is_null());
}

#[tokio::test]
async fn only_reviewers_update_settings() {
    let app = TestApp::new().await.unwrap();
    let maker = app.user("maker1", Role::Maker).await;
    let checker = app.user("checker1", Role::Checker).await;
    let token = app.token(&checker);

    let (status, _) = app
        .put("/settings", &app.token(&maker), json!({"companyName": "Mine"}))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.put("/settings", &token, json!({"defaultVat": -1})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, updated) = app
        .put(
            "/settings",
            &token,
            json!({"companyName": "Globex", "defaultVat": 5, "checkerSignature": "data:image/png;base64,AAAA"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["companyName"], "Globex");
    assert_eq!(updated["defaultVat"], 5.0);
    assert_eq!(updated["checkerSignature"], "data:image/png;base64,AAAA");
    assert_eq!(updated["updatedBy"], checker.id.to_string());

    let (_, cleared) = app
        .put("/settings", &token, json!({"checkerSignature": null}))
        .await;
    assert!(cleared["checkerSignature"].is_null());
    assert_eq!(cleared["companyName"], "Globex");
}
