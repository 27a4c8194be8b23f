use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::errors::ServiceError;
use crate::services::payables::PayablePaymentRequest;
use crate::AppState;

async fn list_payables(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let payables = state.services.payables.list_payables().await?;
    Ok(Json(payables))
}

/// Apply a payment against a payable (the payable-settlement procedure).
async fn settle_payment(
    State(state): State<AppState>,
    Json(request): Json<PayablePaymentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state.services.payables.settle_payment(request).await?;
    Ok(Json(result))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payables))
        .route("/", post(settle_payment))
}
