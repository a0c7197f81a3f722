//! Black-box tests over the HTTP surface: auth, role gates, error mapping
//! and the decision endpoints, exercised through the real router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

use stockline_api::app::{build_app, seed};
use stockline_engines::FallbackCoordinator;
use stockline_store::{InventoryService, MemoryStore};

const ADMIN: &str = "admin-demo-key";
const MANAGER: &str = "manager-demo-key";
const VIEWER: &str = "viewer-demo-key";

fn test_app() -> Router {
    let service = InventoryService::new(Arc::new(MemoryStore::new()), FallbackCoordinator::offline());
    seed::seed_demo(&service).expect("seed");
    build_app(service)
}

fn request(method: &str, uri: &str, key: Option<&str>, body: Option<JsonValue>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> JsonValue {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app();
    let response = app
        .oneshot(request("GET", "/health", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_or_bogus_key_is_unauthorized() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(request("GET", "/api/items", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(request("GET", "/api/items", Some("nope"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_reflects_the_resolved_principal() {
    let app = test_app();
    let response = app
        .oneshot(request("GET", "/api/me", Some(VIEWER), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["username"], "viewer");
    assert_eq!(body["role"], "viewer");
}

#[tokio::test]
async fn viewer_cannot_write_inventory() {
    let app = test_app();
    let body = json!({
        "sku": "NEW-1", "name": "Thing", "category": "Misc",
        "quantity": 5, "reorder_threshold": 2, "unit_cost": 1.0,
    });
    let response = app
        .oneshot(request("POST", "/api/items", Some(VIEWER), Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn item_lifecycle_over_http() {
    let app = test_app();

    let created = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/items",
            Some(MANAGER),
            Some(json!({
                "sku": "NEW-1", "name": "Label Printer", "category": "Electronics",
                "quantity": 20, "reorder_threshold": 10, "unit_cost": 55.0,
            })),
        ))
        .await
        .unwrap();
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = json_body(created).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["status"], "in_stock");

    // Duplicate SKU maps to 409.
    let dup = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/items",
            Some(MANAGER),
            Some(json!({
                "sku": "NEW-1", "name": "Other", "category": "Electronics",
                "quantity": 1, "reorder_threshold": 1, "unit_cost": 1.0,
            })),
        ))
        .await
        .unwrap();
    assert_eq!(dup.status(), StatusCode::CONFLICT);

    // Outbound past the threshold flips status and records the event.
    let adjusted = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/items/{id}/quantity"),
            Some(MANAGER),
            Some(json!({"event_type": "outbound", "quantity_delta": -15})),
        ))
        .await
        .unwrap();
    assert_eq!(adjusted.status(), StatusCode::OK);
    let adjusted = json_body(adjusted).await;
    assert_eq!(adjusted["item"]["quantity"], 5);
    assert_eq!(adjusted["item"]["status"], "low_stock");
    assert_eq!(adjusted["event"]["quantity_before"], 20);

    // Over-draw maps to 422.
    let overdraw = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/items/{id}/quantity"),
            Some(MANAGER),
            Some(json!({"event_type": "outbound", "quantity_delta": -10})),
        ))
        .await
        .unwrap();
    assert_eq!(overdraw.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Delete, then the item reads as gone.
    let deleted = app
        .clone()
        .oneshot(request(
            "DELETE",
            &format!("/api/items/{id}"),
            Some(MANAGER),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let gone = app
        .oneshot(request("GET", &format!("/api/items/{id}"), Some(VIEWER), None))
        .await
        .unwrap();
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_filters_by_status() {
    let app = test_app();
    let response = app
        .oneshot(request(
            "GET",
            "/api/items?status=low_stock&sort_by=quantity&sort_dir=asc",
            Some(VIEWER),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let items = body["items"].as_array().unwrap();
    assert!(!items.is_empty());
    assert!(items.iter().all(|item| item["status"] == "low_stock"));
}

#[tokio::test]
async fn decision_endpoints_answer_without_an_advisor() {
    let app = test_app();

    let reorder = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/ai/reorder-suggestions",
            Some(VIEWER),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(reorder.status(), StatusCode::OK);
    let reorder = json_body(reorder).await;
    assert_eq!(reorder["source"], "fallback");
    assert!(reorder["model"].is_null());
    assert!(reorder["suggestions"].is_array());

    let anomalies = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/ai/anomaly-alerts?days=7",
            Some(VIEWER),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(anomalies.status(), StatusCode::OK);
    assert_eq!(json_body(anomalies).await["source"], "fallback");

    let search = app
        .oneshot(request(
            "POST",
            "/api/ai/natural-language-search",
            Some(VIEWER),
            Some(json!({"query": "low stock under 30"})),
        ))
        .await
        .unwrap();
    assert_eq!(search.status(), StatusCode::OK);
    let search = json_body(search).await;
    assert_eq!(search["source"], "fallback");
    assert_eq!(search["parsed_filters"]["status"], "low_stock");
    assert_eq!(search["parsed_filters"]["max_qty"], 30);
    assert!(search["total"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn user_administration_is_admin_only() {
    let app = test_app();

    let denied = app
        .clone()
        .oneshot(request("GET", "/api/users", Some(MANAGER), None))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let users = app
        .clone()
        .oneshot(request("GET", "/api/users", Some(ADMIN), None))
        .await
        .unwrap();
    assert_eq!(users.status(), StatusCode::OK);
    let users = json_body(users).await;
    let viewer_id = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "viewer")
        .unwrap()["id"]
        .as_i64()
        .unwrap();
    // API keys never appear in responses.
    assert!(users[0].get("api_key").is_none());

    let promoted = app
        .oneshot(request(
            "PATCH",
            &format!("/api/users/{viewer_id}/role"),
            Some(ADMIN),
            Some(json!({"role": "manager"})),
        ))
        .await
        .unwrap();
    assert_eq!(promoted.status(), StatusCode::OK);
    assert_eq!(json_body(promoted).await["role"], "manager");
}

#[tokio::test]
async fn audit_trail_is_visible_and_newest_first() {
    let app = test_app();
    let response = app
        .oneshot(request("GET", "/api/audit?limit=5", Some(VIEWER), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 5);
    // The legacy item is seeded last, after the movement events.
    assert_eq!(entries[0]["action"], "ITEM_CREATE");
    assert_eq!(entries[1]["action"], "ITEM_QUANTITY_ADJUST");
}
