use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;

use crate::errors::ServiceError;
use crate::services::suppliers::{
    create_supplier as create_supplier_service, delete_supplier as delete_supplier_service,
    list_suppliers as list_suppliers_service, update_supplier as update_supplier_service,
    SupplierInput,
};
use crate::AppState;

async fn list_suppliers(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let suppliers = list_suppliers_service(&state.db).await?;
    Ok(Json(suppliers))
}

async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<SupplierInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = create_supplier_service(&state.db, input).await?;
    Ok(Json(created))
}

async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<SupplierInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = update_supplier_service(&state.db, id, input).await?;
    Ok(Json(updated))
}

async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    delete_supplier_service(&state.db, id).await?;
    Ok(Json(json!({ "message": "Supplier deleted successfully" })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers))
        .route("/", post(create_supplier))
        .route("/:id", put(update_supplier))
        .route("/:id", delete(delete_supplier))
}
