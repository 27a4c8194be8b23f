mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn pos_sale_settles_stock_movements_and_ledger() {
    let app = TestApp::new().await;
    let customer_id = app.seed_customer("Ana Torres", "ana@example.com").await;
    let coffee = app.seed_product("Café de grano", 10.0, 5).await;
    let sugar = app.seed_product("Azúcar 1kg", 4.5, 3).await;

    let (status, order) = app
        .post(
            "/orders",
            json!({
                "kind": "pos_sale",
                "customer_id": customer_id,
                "payment_method_id": 3,
                "products": [
                    { "product_id": coffee, "quantity": 2, "price": 10.0 },
                    { "product_id": sugar, "quantity": 1, "price": 4.5 }
                ],
                "total": 24.5,
                "cash_received": 30.0,
                "change": 5.5
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "sale failed: {order}");
    assert_eq!(order["status"], "completed");
    assert_eq!(order["total_amount"], 24.5);
    assert_eq!(order["customer"]["name"], "Ana Torres");

    // Stock decremented by exactly the requested quantities.
    assert_eq!(app.stock_of(coffee).await, 3);
    assert_eq!(app.stock_of(sugar).await, 2);

    // One negative movement per line, linked to the order.
    let (status, movements) = app.get("/inventory/movements?type=sale").await;
    assert_eq!(status, StatusCode::OK);
    let movements = movements.as_array().unwrap();
    assert_eq!(movements.len(), 2);
    for movement in movements {
        assert_eq!(movement["order_id"], order["id"]);
        assert!(movement["quantity"].as_i64().unwrap() < 0);
        assert!(movement["product"]["name"].is_string());
    }

    // One income ledger row tagged selling, with the cash details echoed.
    let (status, transactions) = app.get("/transactions").await;
    assert_eq!(status, StatusCode::OK);
    let transactions = transactions.as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    let tx = &transactions[0];
    assert_eq!(tx["type"], "income");
    assert_eq!(tx["category"], "selling");
    assert_eq!(tx["amount"], 24.5);
    let description = tx["description"].as_str().unwrap();
    assert!(description.contains("Efectivo"));
    assert!(description.contains("Cambio"));
}

#[tokio::test]
async fn oversell_rejects_whole_sale_with_no_partial_writes() {
    let app = TestApp::new().await;
    let plenty = app.seed_product("Harina", 50.0, 100).await;
    let scarce = app.seed_product("Vainilla", 80.0, 1).await;

    let (status, body) = app
        .post(
            "/orders",
            json!({
                "kind": "pos_sale",
                "products": [
                    { "product_id": plenty, "quantity": 5, "price": 50.0 },
                    { "product_id": scarce, "quantity": 2, "price": 80.0 }
                ],
                "total": 410.0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Stock insuficiente para Vainilla");

    // All-or-nothing: nothing was written anywhere.
    let (_, orders) = app.get("/orders").await;
    assert_eq!(orders.as_array().unwrap().len(), 0);
    let (_, movements) = app.get("/inventory/movements").await;
    assert_eq!(movements.as_array().unwrap().len(), 0);
    let (_, transactions) = app.get("/transactions").await;
    assert_eq!(transactions.as_array().unwrap().len(), 0);
    assert_eq!(app.stock_of(plenty).await, 100);
    assert_eq!(app.stock_of(scarce).await, 1);
}

#[tokio::test]
async fn sale_referencing_unknown_product_is_a_validation_error() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/orders",
            json!({
                "kind": "pos_sale",
                "products": [{ "product_id": 999, "quantity": 1, "price": 1.0 }],
                "total": 1.0
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
}

#[tokio::test]
async fn sale_with_empty_line_items_is_rejected() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post(
            "/orders",
            json!({ "kind": "pos_sale", "products": [], "total": 0.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn manual_order_has_no_stock_or_ledger_side_effects() {
    let app = TestApp::new().await;
    let product = app.seed_product("Té verde", 6.0, 10).await;

    let (status, order) = app
        .post(
            "/orders",
            json!({ "kind": "manual_order", "total_amount": 12.5 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_amount"], 12.5);

    assert_eq!(app.stock_of(product).await, 10);
    let (_, movements) = app.get("/inventory/movements").await;
    assert_eq!(movements.as_array().unwrap().len(), 0);
    let (_, transactions) = app.get("/transactions").await;
    assert_eq!(transactions.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn order_update_and_delete_round_trip() {
    let app = TestApp::new().await;

    let (_, order) = app
        .post(
            "/orders",
            json!({ "kind": "manual_order", "total_amount": 9.0 }),
        )
        .await;
    let order_id = order["id"].as_i64().unwrap();

    let (status, updated) = app
        .put(
            &format!("/orders/{order_id}"),
            json!({ "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["total_amount"], 9.0);

    let (status, body) = app.delete(&format!("/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order and related items deleted successfully");

    let (_, orders) = app.get("/orders").await;
    assert_eq!(orders.as_array().unwrap().len(), 0);

    let (status, _) = app.delete(&format!("/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_without_kind_tag_is_rejected() {
    let app = TestApp::new().await;
    let product = app.seed_product("Pan dulce", 2.0, 4).await;

    // The legacy shape-sniffing payload is no longer accepted.
    let (status, _) = app
        .post(
            "/orders",
            json!({
                "products": [{ "product_id": product, "quantity": 1, "price": 2.0 }],
                "total": 2.0
            }),
        )
        .await;
    assert!(status.is_client_error(), "expected rejection, got {status}");
}
