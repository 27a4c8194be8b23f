mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn all_zero_delta_list_is_rejected_entirely() {
    let app = TestApp::new().await;
    let a = app.seed_product("Galletas", 1.5, 8).await;
    let b = app.seed_product("Jugo", 2.0, 6).await;

    let (status, body) = app
        .post(
            "/inventory/adjustments",
            json!({
                "reason": "conteo físico",
                "items": [
                    { "productId": a, "quantity": 0 },
                    { "productId": b, "quantity": 0 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");

    let (_, adjustments) = app.get("/inventory/adjustments").await;
    assert_eq!(adjustments.as_array().unwrap().len(), 0);
    assert_eq!(app.stock_of(a).await, 8);
    assert_eq!(app.stock_of(b).await, 6);
}

#[tokio::test]
async fn empty_item_list_is_rejected() {
    let app = TestApp::new().await;
    let (status, _) = app
        .post("/inventory/adjustments", json!({ "items": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn mixed_list_creates_rows_only_for_valid_items() {
    let app = TestApp::new().await;
    let untouched = app.seed_product("Leche", 1.2, 5).await;
    let shrink = app.seed_product("Yogurt", 0.9, 1).await;
    let grow = app.seed_product("Cereal", 4.0, 2).await;

    let (status, adjustment) = app
        .post(
            "/inventory/adjustments",
            json!({
                "reason": "merma y recepción",
                "items": [
                    { "productId": untouched, "quantity": 0 },
                    { "productId": shrink, "quantity": -2, "note": "caducado" },
                    { "productId": 0, "quantity": 5 },
                    { "productId": grow, "quantity": 7 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "adjustment failed: {adjustment}");

    let items = adjustment["items"].as_array().unwrap();
    assert_eq!(items.len(), 2, "only the valid items create rows");

    // Signed deltas apply directly; adjustments have no stock floor.
    assert_eq!(app.stock_of(untouched).await, 5);
    assert_eq!(app.stock_of(shrink).await, -1);
    assert_eq!(app.stock_of(grow).await, 9);

    let (_, movements) = app.get("/inventory/movements?type=adjustment").await;
    let movements = movements.as_array().unwrap();
    assert_eq!(movements.len(), 2);
    for movement in movements {
        assert_eq!(movement["adjustment_id"], adjustment["id"]);
        assert!(movement["unit_cost"].is_null());
    }

    // Adjustments are not financial events.
    let (_, transactions) = app.get("/transactions").await;
    assert_eq!(transactions.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn movement_filters_by_product_and_kind() {
    let app = TestApp::new().await;
    let a = app.seed_product("Detergente", 5.0, 10).await;
    let b = app.seed_product("Jabón", 1.0, 10).await;

    // One adjustment per product, then a sale touching only `a`.
    let (status, _) = app
        .post(
            "/inventory/adjustments",
            json!({ "items": [
                { "productId": a, "quantity": 2 },
                { "productId": b, "quantity": 3 }
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .post(
            "/orders",
            json!({
                "kind": "pos_sale",
                "products": [{ "product_id": a, "quantity": 1, "price": 5.0 }],
                "total": 5.0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, all) = app.get("/inventory/movements").await;
    assert_eq!(all.as_array().unwrap().len(), 3);

    let (_, for_a) = app.get(&format!("/inventory/movements?productId={a}")).await;
    assert_eq!(for_a.as_array().unwrap().len(), 2);

    let (_, sales_only) = app.get("/inventory/movements?type=sale").await;
    let sales_only = sales_only.as_array().unwrap();
    assert_eq!(sales_only.len(), 1);
    assert_eq!(sales_only[0]["quantity"], -1);

    let (status, _) = app.get("/inventory/movements?type=teleport").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
