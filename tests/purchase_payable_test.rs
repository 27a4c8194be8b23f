mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

#[tokio::test]
async fn cash_purchase_increments_stock_and_writes_expense() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Distribuidora Norte").await;
    let product = app.seed_product("Aceite 1L", 3.0, 0).await;

    let (status, purchase) = app
        .post(
            "/purchases",
            json!({
                "supplierId": supplier,
                "items": [{ "productId": product, "quantity": 4, "price": 2.5 }],
                "paymentTerm": "cash",
                "paymentMethodId": 3
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "purchase failed: {purchase}");
    assert_eq!(purchase["total_amount"], 10.0);
    assert_eq!(purchase["supplier"]["name"], "Distribuidora Norte");
    assert_eq!(purchase["items"].as_array().unwrap().len(), 1);

    assert_eq!(app.stock_of(product).await, 4);

    // Movement logged with the line price as unit cost.
    let (_, movements) = app.get("/inventory/movements?type=purchase").await;
    let movements = movements.as_array().unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0]["quantity"], 4);
    assert_eq!(movements[0]["unit_cost"], 2.5);
    assert_eq!(movements[0]["purchase_id"], purchase["id"]);

    // Cash purchases pay immediately: expense ledger row, no payable.
    let (_, transactions) = app.get("/transactions").await;
    let transactions = transactions.as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["type"], "expense");
    assert_eq!(transactions[0]["category"], "purchase");
    assert_eq!(transactions[0]["amount"], 10.0);

    let (_, payables) = app.get("/payables").await;
    assert_eq!(payables.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn credit_purchase_opens_a_payable_and_skips_the_ledger() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Abarrotes del Sur").await;
    let product = app.seed_product("Arroz 1kg", 8.0, 2).await;

    let (status, purchase) = app
        .post(
            "/purchases",
            json!({
                "supplierId": supplier,
                "items": [{ "productId": product, "quantity": 10, "price": 5.0 }],
                "paymentTerm": "credit",
                "dueDate": "2026-09-01"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "purchase failed: {purchase}");
    assert_eq!(purchase["total_amount"], 50.0);
    assert_eq!(app.stock_of(product).await, 12);

    let (_, payables) = app.get("/payables").await;
    let payables = payables.as_array().unwrap();
    assert_eq!(payables.len(), 1);
    let payable = &payables[0];
    assert_eq!(payable["amount"], 50.0);
    assert_eq!(payable["balance"], 50.0);
    assert_eq!(payable["status"], "open");
    assert_eq!(payable["purchase"]["id"], purchase["id"]);
    assert_eq!(payable["supplier"]["name"], "Abarrotes del Sur");

    // No money moved yet.
    let (_, transactions) = app.get("/transactions").await;
    assert_eq!(transactions.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn purchase_validation_rejects_bad_lines_and_suppliers() {
    let app = TestApp::new().await;
    let supplier = app.seed_supplier("Proveedor X").await;
    let product = app.seed_product("Sal", 1.0, 0).await;

    // Zero quantity
    let (status, _) = app
        .post(
            "/purchases",
            json!({
                "supplierId": supplier,
                "items": [{ "productId": product, "quantity": 0, "price": 1.0 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Negative price
    let (status, _) = app
        .post(
            "/purchases",
            json!({
                "supplierId": supplier,
                "items": [{ "productId": product, "quantity": 1, "price": -1.0 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Empty items
    let (status, _) = app
        .post(
            "/purchases",
            json!({ "supplierId": supplier, "items": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Unknown supplier
    let (status, _) = app
        .post(
            "/purchases",
            json!({
                "supplierId": 999,
                "items": [{ "productId": product, "quantity": 1, "price": 1.0 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing leaked from the rejected attempts.
    assert_eq!(app.stock_of(product).await, 0);
    let (_, purchases) = app.get("/purchases").await;
    assert_eq!(purchases.as_array().unwrap().len(), 0);
}

async fn open_payable(app: &TestApp, amount: f64) -> i64 {
    let supplier = app.seed_supplier("Crédito SA").await;
    let product = app.seed_product("Frijol 1kg", 10.0, 0).await;
    let (status, _) = app
        .post(
            "/purchases",
            json!({
                "supplierId": supplier,
                "items": [{ "productId": product, "quantity": 1, "price": amount }],
                "paymentTerm": "credit",
                "dueDate": "2026-12-31"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, payables) = app.get("/payables").await;
    payables.as_array().unwrap()[0]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn partial_payment_reduces_balance_and_stays_open() {
    let app = TestApp::new().await;
    let payable_id = open_payable(&app, 100.0).await;

    let (status, result) = app
        .post(
            "/payables",
            json!({ "payableId": payable_id, "amount": 40.0, "paymentMethodId": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "payment failed: {result}");
    assert_eq!(result["payment"]["amount"], 40.0);
    assert_eq!(result["payable"]["balance"], 60.0);
    assert_eq!(result["payable"]["status"], "open");
    assert_eq!(result["payable"]["payments"].as_array().unwrap().len(), 1);

    // The payment itself is an expense in the ledger.
    let (_, transactions) = app.get("/transactions").await;
    let transactions = transactions.as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["category"], "payable_payment");
    assert_eq!(transactions[0]["amount"], 40.0);
}

#[tokio::test]
async fn exact_payoff_transitions_to_paid() {
    let app = TestApp::new().await;
    let payable_id = open_payable(&app, 100.0).await;

    let (status, result) = app
        .post(
            "/payables",
            json!({ "payableId": payable_id, "amount": 100.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["payable"]["balance"], 0.0);
    assert_eq!(result["payable"]["status"], "paid");
    assert_eq!(result["payable"]["payments"].as_array().unwrap().len(), 1);

    // No payment method given: the ledger stays untouched.
    let (_, transactions) = app.get("/transactions").await;
    assert_eq!(transactions.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn overpayment_is_rejected_and_balance_unchanged() {
    let app = TestApp::new().await;
    let payable_id = open_payable(&app, 50.0).await;

    let (status, body) = app
        .post(
            "/payables",
            json!({ "payableId": payable_id, "amount": 60.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Payment amount exceeds balance");

    let (_, payables) = app.get("/payables").await;
    let payable = &payables.as_array().unwrap()[0];
    assert_eq!(payable["balance"], 50.0);
    assert_eq!(payable["status"], "open");
    assert_eq!(payable["payments"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn non_positive_amounts_and_missing_payables_are_rejected() {
    let app = TestApp::new().await;
    let payable_id = open_payable(&app, 50.0).await;

    let (status, _) = app
        .post(
            "/payables",
            json!({ "payableId": payable_id, "amount": 0.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post("/payables", json!({ "payableId": 999, "amount": 10.0 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Payable not found");
}
