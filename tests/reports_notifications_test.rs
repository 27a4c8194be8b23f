mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestApp;

async fn seed_ledger(app: &TestApp) {
    // All rows land on "today", so the daily series has a single point.
    for body in [
        json!({ "type": "income", "category": "selling", "amount": 200.0 }),
        json!({ "type": "expense", "category": "purchase", "amount": 50.0 }),
        json!({ "type": "income", "amount": 10.0 }),
    ] {
        let (status, created) = app.post("/transactions", body).await;
        assert_eq!(status, StatusCode::OK, "seed failed: {created}");
    }
}

#[tokio::test]
async fn revenue_expense_and_profit_totals() {
    let app = TestApp::new().await;
    seed_ledger(&app).await;

    let (_, revenue) = app.get("/admin/revenue/total").await;
    assert_eq!(revenue["totalRevenue"], 210.0);

    let (_, expenses) = app.get("/admin/expenses/total").await;
    assert_eq!(expenses["totalExpenses"], 50.0);

    // Profit counts selling income only, minus all expenses.
    let (_, profit) = app.get("/admin/profit/total").await;
    assert_eq!(profit["totalProfit"], 150.0);
}

#[tokio::test]
async fn category_breakdowns_skip_uncategorized_rows() {
    let app = TestApp::new().await;
    seed_ledger(&app).await;

    let (_, revenue) = app.get("/admin/revenue/category").await;
    assert_eq!(revenue["revenueByCategory"], json!({ "selling": 200.0 }));

    let (_, expenses) = app.get("/admin/expenses/category").await;
    assert_eq!(expenses["expensesByCategory"], json!({ "purchase": 50.0 }));
}

#[tokio::test]
async fn margin_series_and_cash_flow() {
    let app = TestApp::new().await;
    seed_ledger(&app).await;

    let (_, margin) = app.get("/admin/profit/margin").await;
    let series = margin["profitMargin"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    // (200 - 50) / 200 * 100
    assert_eq!(series[0]["margin"], 75.0);

    let (_, cash_flow) = app.get("/admin/cashflow").await;
    let days = cash_flow["cashFlow"].as_object().unwrap();
    assert_eq!(days.len(), 1);
    let total: f64 = days.values().map(|v| v.as_f64().unwrap()).sum();
    assert_eq!(total, 260.0);
}

#[tokio::test]
async fn margin_is_zero_on_days_without_selling_income() {
    let app = TestApp::new().await;
    let (status, _) = app
        .post(
            "/transactions",
            json!({ "type": "expense", "category": "purchase", "amount": 30.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, margin) = app.get("/admin/profit/margin").await;
    let series = margin["profitMargin"].as_array().unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0]["margin"], 0.0);
}

#[tokio::test]
async fn transactions_crud_round_trip() {
    let app = TestApp::new().await;

    let (status, created) = app
        .post(
            "/transactions",
            json!({ "type": "income", "category": "selling", "amount": 12.5, "description": "venta mostrador" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["status"], "completed");
    let id = created["id"].as_i64().unwrap();

    let (status, _) = app
        .post("/transactions", json!({ "type": "transfer", "amount": 1.0 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "type must be income or expense");

    let (status, updated) = app
        .put(
            &format!("/transactions/{id}"),
            json!({ "type": "expense", "category": "purchase", "amount": 13.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["type"], "expense");
    assert_eq!(updated["amount"], 13.0);

    let (status, body) = app.delete(&format!("/transactions/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Transaction deleted successfully");

    let (_, remaining) = app.get("/transactions").await;
    assert_eq!(remaining.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn notifications_surface_low_stock_and_due_payables() {
    let app = TestApp::new().await;

    // Threshold is 10 by default: 0 → high, 2 → medium, 25 → not listed.
    let out_of_stock = app.seed_product("Velas", 1.0, 0).await;
    app.seed_product("Cerillos", 0.5, 2).await;
    app.seed_product("Pilas", 9.0, 25).await;

    // One payable due tomorrow (high: <= 2 days), one long overdue.
    let supplier = app.seed_supplier("Crédito MX").await;
    let product = app.seed_product("Carbón", 4.0, 50).await;
    let due_soon = (chrono::Utc::now() + chrono::Duration::days(1))
        .date_naive()
        .to_string();
    for due_date in [due_soon.as_str(), "2020-01-01"] {
        let (status, _) = app
            .post(
                "/purchases",
                json!({
                    "supplierId": supplier,
                    "items": [{ "productId": product, "quantity": 1, "price": 75.0 }],
                    "paymentTerm": "credit",
                    "dueDate": due_date
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app.get("/notifications").await;
    assert_eq!(status, StatusCode::OK);

    let summary = &body["summary"];
    assert_eq!(summary["low_stock_count"], 2);
    assert_eq!(summary["due_soon_payables_count"], 1);
    assert_eq!(summary["overdue_payables_count"], 1);
    assert_eq!(summary["total_count"], 4);

    let notifications = body["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 4);

    // Sorted by priority: the three high entries come first.
    let priorities: Vec<&str> = notifications
        .iter()
        .map(|n| n["priority"].as_str().unwrap())
        .collect();
    assert_eq!(priorities, vec!["high", "high", "high", "medium"]);

    let stock_alert = notifications
        .iter()
        .find(|n| n["id"] == format!("stock_{out_of_stock}"))
        .expect("out-of-stock notification");
    assert_eq!(stock_alert["type"], "low_stock");
    assert_eq!(stock_alert["title"], "Producto sin stock");

    let overdue = notifications
        .iter()
        .find(|n| n["type"] == "payable_overdue")
        .expect("overdue notification");
    assert_eq!(overdue["priority"], "high");
    assert_eq!(overdue["data"]["supplier"]["name"], "Crédito MX");

    let due = notifications
        .iter()
        .find(|n| n["type"] == "payable_due_soon")
        .expect("due-soon notification");
    assert_eq!(due["data"]["days_until_due"], 1);
}

#[tokio::test]
async fn health_endpoint_reports_database_status() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}
