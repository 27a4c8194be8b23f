use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};

use crate::errors::ServiceError;
use crate::AppState;

async fn list_notifications(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state
        .services
        .notifications
        .build(
            state.config.low_stock_threshold,
            state.config.payable_due_soon_days,
        )
        .await?;
    Ok(Json(response))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_notifications))
}
