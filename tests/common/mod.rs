// Not every test binary exercises every helper.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use bodega_api::{config::AppConfig, db, AppState};

/// Test harness backed by an in-memory SQLite database.
///
/// The pool is pinned to a single connection so the in-memory database
/// survives for the lifetime of the test.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );

        let mut db_cfg = db::DbConfig::from(&cfg);
        db_cfg.max_connections = 1;
        db_cfg.min_connections = 1;

        let pool = db::establish_connection_with_config(&db_cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");
        db::verify_schema(&pool)
            .await
            .expect("schema verification failed");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = bodega_api::app(state.clone());
        Self { router, state }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = match body {
            Some(json) => Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .expect("failed to build request"),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Seed a product and return its id.
    pub async fn seed_product(&self, name: &str, price: f64, in_stock: i64) -> i64 {
        let (status, body) = self
            .post(
                "/products",
                serde_json::json!({ "name": name, "price": price, "in_stock": in_stock }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "seed_product failed: {body}");
        body["id"].as_i64().expect("product id")
    }

    /// Seed a supplier and return its id.
    pub async fn seed_supplier(&self, name: &str) -> i64 {
        let (status, body) = self
            .post("/suppliers", serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::OK, "seed_supplier failed: {body}");
        body["id"].as_i64().expect("supplier id")
    }

    /// Seed a customer and return its id.
    pub async fn seed_customer(&self, name: &str, email: &str) -> i64 {
        let (status, body) = self
            .post(
                "/customers",
                serde_json::json!({ "name": name, "email": email }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "seed_customer failed: {body}");
        body["id"].as_i64().expect("customer id")
    }

    /// Current stock for a product, read through the public listing.
    pub async fn stock_of(&self, product_id: i64) -> i64 {
        let (status, body) = self.get("/products").await;
        assert_eq!(status, StatusCode::OK);
        body.as_array()
            .expect("products array")
            .iter()
            .find(|p| p["id"].as_i64() == Some(product_id))
            .and_then(|p| p["in_stock"].as_i64())
            .expect("product stock")
    }
}
