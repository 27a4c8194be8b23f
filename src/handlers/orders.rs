use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;

use crate::errors::ServiceError;
use crate::services::sales::{CreateOrderRequest, UpdateOrderRequest};
use crate::AppState;

async fn list_orders(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let orders = state.services.sales.list_orders().await?;
    Ok(Json(orders))
}

/// Create an order. The request is tagged: `kind: "pos_sale"` runs the
/// full checkout settlement, `kind: "manual_order"` just inserts a row.
async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.sales.create_order(request).await?;
    Ok(Json(order))
}

async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.sales.update_order(id, request).await?;
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.sales.delete_order(id).await?;
    Ok(Json(
        json!({ "message": "Order and related items deleted successfully" }),
    ))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/", post(create_order))
        .route("/:id", put(update_order))
        .route("/:id", delete(delete_order))
}
