use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::errors::ServiceError;
use crate::services::catalog::CreateProductRequest;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub barcode: Option<String>,
}

/// List products, or look a single one up by barcode (`?barcode=`).
async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    if let Some(barcode) = query.barcode.as_deref().filter(|b| !b.is_empty()) {
        let product = state.services.catalog.find_by_barcode(barcode).await?;
        return Ok(Json(product).into_response());
    }
    let products = state.services.catalog.list_products().await?;
    Ok(Json(products).into_response())
}

async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.catalog.create_product(request).await?;
    Ok(Json(created))
}

async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.catalog.update_product(id, request).await?;
    Ok(Json(updated))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.catalog.delete_product(id).await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
}
