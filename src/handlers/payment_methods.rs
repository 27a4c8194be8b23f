use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use sea_orm::{EntityTrait, QueryOrder};

use crate::entities::payment_method;
use crate::errors::ServiceError;
use crate::AppState;

async fn list_payment_methods(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let methods = payment_method::Entity::find()
        .order_by_asc(payment_method::Column::Id)
        .all(state.db.as_ref())
        .await
        .map_err(ServiceError::from_db)?;
    Ok(Json(methods))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_payment_methods))
}
