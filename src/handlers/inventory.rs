use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::errors::ServiceError;
use crate::services::inventory::{CreateAdjustmentRequest, MovementFilter};
use crate::AppState;

async fn list_adjustments(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let adjustments = state.services.inventory.list_adjustments().await?;
    Ok(Json(adjustments))
}

async fn create_adjustment(
    State(state): State<AppState>,
    Json(request): Json<CreateAdjustmentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let adjustment = state.services.inventory.create_adjustment(request).await?;
    Ok(Json(adjustment))
}

/// Kardex view: `?productId=&from=&to=&type=` all optional.
async fn list_movements(
    State(state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let movements = state.services.inventory.list_movements(filter).await?;
    Ok(Json(movements))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/adjustments", get(list_adjustments))
        .route("/adjustments", post(create_adjustment))
        .route("/movements", get(list_movements))
}
