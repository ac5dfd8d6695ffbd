//! HTTP API 集成测试
//!
//! 通过 tower 的 oneshot 直接驱动路由，不开真实端口。

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use pos_server::api;
use pos_server::core::{Config, ServerState};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_app(dir: &tempfile::TempDir) -> (Router, ServerState) {
    let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    let state = ServerState::initialize(&config).unwrap();
    let app = api::build_app().with_state(state.clone());
    (app, state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _state) = test_app(&dir).await;

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

fn seed_product(state: &ServerState, id: &str, stock: u32, sale_price: i64) {
    state
        .storage
        .put_product(&shared::models::Product {
            id: id.into(),
            name: "Cerveza".into(),
            category_id: "cat-1".into(),
            category_name: "Drinks".into(),
            stock_quantity: stock,
            cost_price: 3_000,
            sale_price,
        })
        .unwrap();
}

#[tokio::test]
async fn test_order_to_sale_happy_path() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&dir).await;

    // Inventory lands in storage out of band; the refresh endpoint
    // pulls it into the catalog view
    seed_product(&state, "p1", 10, 5_000);
    let response = app
        .clone()
        .oneshot(post_json("/api/catalog/refresh", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["products"], 1);
    let product_id = "p1".to_string();

    let response = app
        .clone()
        .oneshot(post_json("/api/tables", json!({"name": "Mesa 1"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let table_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // Add 2 units, pay exactly 10_000 cents
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/tables/{table_id}/order/items"),
            json!({"product_id": product_id, "quantity": 2}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["line_items"][0]["quantity"], 2);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/sales",
            json!({
                "table_id": table_id,
                "payment": {"cash": 10000, "transfer_app": 0, "card": 0}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let sale = body_json(response).await;
    assert_eq!(sale["total"], 10000);
    assert_eq!(sale["receipt_number"], 1);
    assert_eq!(sale["status"], "paid");

    // Availability reflects the committed sale
    let response = app.clone().oneshot(get("/api/products")).await.unwrap();
    let products = body_json(response).await;
    assert_eq!(products[0]["stock_quantity"], 8);
    assert_eq!(products[0]["reserved"], 0);
    assert_eq!(products[0]["available"], 8);

    // And the sale shows up in the range query
    let response = app.oneshot(get("/api/sales?from=0")).await.unwrap();
    let sales = body_json(response).await;
    assert_eq!(sales.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_error_status_codes() {
    let dir = tempfile::tempdir().unwrap();
    let (app, state) = test_app(&dir).await;

    // Unknown table: 404
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/tables/ghost/order/items",
            json!({"product_id": "p1", "quantity": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Reserve beyond stock: 409
    seed_product(&state, "p1", 1, 5_000);
    state.catalog.refresh().unwrap();

    let response = app
        .clone()
        .oneshot(post_json("/api/tables", json!({"name": "Mesa 1"})))
        .await
        .unwrap();
    let table_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/tables/{table_id}/order/items"),
            json!({"product_id": "p1", "quantity": 2}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["details"]["product_id"], "p1");
    assert_eq!(body["details"]["available"], 1);
    assert_eq!(body["details"]["requested"], 2);

    // Payment that does not cover the total: 400
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/tables/{table_id}/order/items"),
            json!({"product_id": "p1", "quantity": 1}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(post_json(
            "/api/sales",
            json!({
                "table_id": table_id,
                "payment": {"cash": 1, "transfer_app": 0, "card": 0}
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
