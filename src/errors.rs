use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use sea_orm::SqlErr;
use serde_json::json;

/// Unified error type for service and handler layers.
///
/// Every failure a handler can observe maps onto one of these variants;
/// the HTTP layer renders all of them as a `{"error": "..."}` JSON body.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    /// A sale line asked for more units than the stock snapshot holds.
    /// Carries the offending product's name.
    #[error("Stock insuficiente para {0}")]
    InsufficientStock(String),

    /// A required table or column is missing. Surfaced with a migration
    /// hint so a half-migrated deployment is diagnosable from the client.
    #[error("{0}")]
    SchemaNotMigrated(String),

    #[error("{0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl ServiceError {
    /// Classify a database error into the service taxonomy.
    ///
    /// Unique-constraint violations become conflicts; missing tables or
    /// columns become the schema-not-migrated signal. Everything else
    /// stays a generic database failure.
    pub fn from_db(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                return ServiceError::Conflict("Unique constraint violation".to_string());
            }
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                return ServiceError::Conflict("Linked records exist".to_string());
            }
            _ => {}
        }
        let msg = err.to_string().to_ascii_lowercase();
        if msg.contains("no such table")
            || msg.contains("no such column")
            || msg.contains("does not exist")
        {
            return ServiceError::SchemaNotMigrated(
                "Schema not applied. Run the embedded migrations (auto_migrate) first".to_string(),
            );
        }
        ServiceError::Database(err)
    }

    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) | Self::InsufficientStock(_) => StatusCode::CONFLICT,
            Self::SchemaNotMigrated(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for HTTP responses. Internal failures return a
    /// generic message instead of leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.response_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::InsufficientStock("Cafe".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::SchemaNotMigrated("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServiceError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_details_are_hidden() {
        assert_eq!(
            ServiceError::Internal("secret connection string".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::Database(DbErr::Custom("sensitive".into())).response_message(),
            "Internal server error"
        );
        // User-facing errors keep their message.
        assert_eq!(
            ServiceError::InsufficientStock("Cafe".into()).response_message(),
            "Stock insuficiente para Cafe"
        );
    }

    #[test]
    fn missing_table_classifies_as_schema_error() {
        let err = ServiceError::from_db(DbErr::Custom("no such table: stock_movements".into()));
        assert!(matches!(err, ServiceError::SchemaNotMigrated(_)));

        let err = ServiceError::from_db(DbErr::Custom(
            "relation \"payables\" does not exist".into(),
        ));
        assert!(matches!(err, ServiceError::SchemaNotMigrated(_)));

        let err = ServiceError::from_db(DbErr::Custom("connection reset".into()));
        assert!(matches!(err, ServiceError::Database(_)));
    }

    #[tokio::test]
    async fn response_body_is_single_error_field() {
        let response = ServiceError::NotFound("Payable not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload, json!({ "error": "Payable not found" }));
    }
}
