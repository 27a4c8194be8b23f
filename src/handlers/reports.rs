use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};

use crate::errors::ServiceError;
use crate::AppState;

async fn revenue_total(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.reports.revenue_total().await?))
}

async fn revenue_by_category(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.reports.revenue_by_category().await?))
}

async fn expenses_total(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.reports.expenses_total().await?))
}

async fn expenses_by_category(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.reports.expenses_by_category().await?))
}

async fn profit_total(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.reports.profit_total().await?))
}

async fn profit_margin(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.reports.profit_margin().await?))
}

async fn cash_flow(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.reports.cash_flow().await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/revenue/total", get(revenue_total))
        .route("/revenue/category", get(revenue_by_category))
        .route("/expenses/total", get(expenses_total))
        .route("/expenses/category", get(expenses_by_category))
        .route("/profit/total", get(profit_total))
        .route("/profit/margin", get(profit_margin))
        .route("/cashflow", get(cash_flow))
}
