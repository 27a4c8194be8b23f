use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::errors::ServiceError;
use crate::services::purchasing::CreatePurchaseRequest;
use crate::AppState;

async fn list_purchases(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let purchases = state.services.purchasing.list_purchases().await?;
    Ok(Json(purchases))
}

async fn create_purchase(
    State(state): State<AppState>,
    Json(request): Json<CreatePurchaseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let purchase = state.services.purchasing.create_purchase(request).await?;
    Ok(Json(purchase))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_purchases))
        .route("/", post(create_purchase))
}
