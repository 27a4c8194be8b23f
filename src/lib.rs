//! bodega-api library
//!
//! Backend for a small retail back-office: point of sale, inventory,
//! purchasing, payables, customers and ledger-driven reporting.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod openapi;
pub mod services;

use axum::{routing::get, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone());
        Self {
            db,
            config,
            services,
        }
    }
}

/// All resource routes, one router per family, mounted at the paths the
/// clients already use.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", handlers::products::routes())
        .nest("/categories", handlers::categories::routes())
        .nest("/customers", handlers::customers::routes())
        .nest("/suppliers", handlers::suppliers::routes())
        .nest("/payment-methods", handlers::payment_methods::routes())
        .nest("/orders", handlers::orders::routes())
        .nest("/purchases", handlers::purchases::routes())
        .nest("/payables", handlers::payables::routes())
        .nest("/transactions", handlers::transactions::routes())
        .nest("/inventory", handlers::inventory::routes())
        .nest("/notifications", handlers::notifications::routes())
        .nest("/admin", handlers::reports::routes())
}

/// Build the full application router for the given state. Network-level
/// layers (trace, CORS, compression, timeout) are applied by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "bodega-api up" }))
        .merge(handlers::health::routes())
        .merge(api_routes())
        .merge(openapi::swagger_ui())
        .with_state(state)
}
