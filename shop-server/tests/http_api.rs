//! HTTP surface driven through the router with `oneshot`

mod common;

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::models::Role;
use shop_server::AppState;
use shop_server::api::create_router;
use shop_server::auth::create_token;
use shop_server::services::PageLimits;
use tower::ServiceExt;

use common::*;

const SECRET: &str = "test-secret";

fn app(t: &TestDb) -> Router {
    create_router(AppState {
        pool: t.pool.clone(),
        jwt_secret: SECRET.to_string(),
        page: PageLimits {
            default_size: 20,
            max_size: 100,
        },
    })
}

fn token(user_id: i64) -> String {
    create_token(user_id, "someone@example.com", SECRET).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user_id {
        builder = builder.header("Authorization", format!("Bearer {}", token(id)));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let t = setup().await;
    let (status, body) = send(&app(&t), "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn orders_require_a_valid_token() {
    let t = setup().await;
    let app = app(&t);

    let (status, body) = send(&app, "GET", "/api/v1/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let request = Request::builder()
        .uri("/api/v1/orders")
        .header("Authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_catalog_and_search() {
    let t = setup().await;
    let cat = category(&t.pool, "Lighting").await;
    let lamp = product(&t.pool, cat, "Desk Lamp", 30.0, 10).await;
    let app = app(&t);

    let (status, body) = send(&app, "GET", "/api/v1/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["name"], "Lighting");

    let (status, body) = send(&app, "GET", &format!("/api/v1/products/{lamp}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Desk Lamp");
    assert_eq!(body["data"]["category"]["name"], "Lighting");

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/products/search?title=lamp&sort_by=price_desc",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, body) =
        send(&app, "GET", "/api/v1/products/search?sort_by=bogus", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5);

    let (status, body) = send(&app, "GET", "/api/v1/products/424242", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);
}

#[tokio::test]
async fn order_flow_over_http() {
    let t = setup().await;
    let buyer = user(&t.pool, "buyer@example.com").await;
    let admin = staff(&t.pool, "admin@example.com", Role::SuperAdmin).await;
    let seller = staff(&t.pool, "seller@example.com", Role::Seller).await;
    let cat = category(&t.pool, "Kitchen").await;
    let kettle = product(&t.pool, cat, "Kettle", 10.0, 5).await;
    let mug = product(&t.pool, cat, "Mug", 5.0, 1).await;
    let app = app(&t);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/orders",
        Some(buyer),
        Some(json!({ "items": [
            { "product_id": kettle, "quantity": 2 },
            { "product_id": mug, "quantity": 1 }
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["total_amount"], 25.0);
    let order_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/v1/orders/{order_id}/pay"),
        Some(buyer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Sellers cannot confirm
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/admin/orders/{order_id}/confirm"),
        Some(seller.user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2003);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/admin/orders/{order_id}/confirm"),
        Some(admin.user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "confirmed");
    assert_eq!(ledger(&t.pool, kettle).await, (3, 1));
    assert_eq!(ledger(&t.pool, mug).await, (0, 1));

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/v1/admin/orders/{order_id}/ship"),
        Some(seller.user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "shipped");

    // Users may only move their order to cancelled
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/v1/orders/{order_id}"),
        Some(buyer),
        Some(json!({ "status": "delivered" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4004);

    let (status, body) = send(&app, "GET", "/api/v1/admin/orders", Some(seller.user_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", "/api/v1/orders", Some(buyer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn insufficient_stock_names_the_product() {
    let t = setup().await;
    let buyer = user(&t.pool, "buyer@example.com").await;
    let cat = category(&t.pool, "Kitchen").await;
    let teapot = product(&t.pool, cat, "Teapot", 30.0, 0).await;

    let (status, body) = send(
        &app(&t),
        "POST",
        "/api/v1/orders",
        Some(buyer),
        Some(json!({ "items": [{ "product_id": teapot, "quantity": 1 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 6003);
    assert_eq!(body["details"]["product"], "Teapot");
    assert_eq!(count(&t.pool, "orders").await, 0);
}

#[tokio::test]
async fn role_administration_over_http() {
    let t = setup().await;
    let admin = staff(&t.pool, "admin@example.com", Role::SuperAdmin).await;
    let target = user(&t.pool, "target@example.com").await;
    let app = app(&t);

    let (status, _) = send(&app, "GET", "/api/v1/admin/roles", Some(target), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/admin/roles/assign",
        Some(admin.user_id),
        Some(json!({ "user_id": target, "role": "seller" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "seller");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/v1/admin/roles/user/{target}"),
        Some(admin.user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assigned"], true);

    let (status, body) = send(
        &app,
        "DELETE",
        "/api/v1/admin/roles/remove",
        Some(admin.user_id),
        Some(json!({ "user_id": admin.user_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 8104);

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/admin/roles/all-users",
        Some(admin.user_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}
