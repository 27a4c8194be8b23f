use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use crate::AppState;

/// Liveness plus a database ping. Always returns 200; the body says
/// whether the database answered.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match crate::db::check_connection(state.db.as_ref()).await {
        Ok(()) => "up",
        Err(_) => "down",
    };
    Json(json!({ "status": "ok", "database": database }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
