use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;

use crate::errors::ServiceError;
use crate::services::customers::{
    create_customer as create_customer_service, delete_customer as delete_customer_service,
    list_customers as list_customers_service, update_customer as update_customer_service,
    CustomerInput,
};
use crate::AppState;

async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let customers = list_customers_service(&state.db).await?;
    Ok(Json(customers))
}

async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = create_customer_service(&state.db, input).await?;
    Ok(Json(created))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<CustomerInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = update_customer_service(&state.db, id, input).await?;
    Ok(Json(updated))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    delete_customer_service(&state.db, id).await?;
    Ok(Json(json!({ "message": "Customer deleted successfully" })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_customers))
        .route("/", post(create_customer))
        .route("/:id", put(update_customer))
        .route("/:id", delete(delete_customer))
}
