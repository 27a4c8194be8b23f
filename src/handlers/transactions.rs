use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;

use crate::errors::ServiceError;
use crate::services::transactions::{
    create_transaction as create_transaction_service,
    delete_transaction as delete_transaction_service,
    list_transactions as list_transactions_service,
    update_transaction as update_transaction_service, TransactionInput,
};
use crate::AppState;

async fn list_transactions(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let transactions = list_transactions_service(&state.db).await?;
    Ok(Json(transactions))
}

async fn create_transaction(
    State(state): State<AppState>,
    Json(input): Json<TransactionInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = create_transaction_service(&state.db, input).await?;
    Ok(Json(created))
}

async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<TransactionInput>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = update_transaction_service(&state.db, id, input).await?;
    Ok(Json(updated))
}

async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    delete_transaction_service(&state.db, id).await?;
    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions))
        .route("/", post(create_transaction))
        .route("/:id", put(update_transaction))
        .route("/:id", delete(delete_transaction))
}
