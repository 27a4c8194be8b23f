use crate::{
    db::DbPool,
    entities::ledger_transaction::{self, LedgerKind},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, EntityTrait, ModelTrait, QueryOrder, Set,
};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::ToSchema;

/// Manual ledger entry. Settlement procedures write their own rows; this
/// input covers the transactions page only.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransactionInput {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub r#type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionInput {
    fn kind(&self) -> Result<LedgerKind, ServiceError> {
        LedgerKind::from_str(&self.r#type)
            .map_err(|_| ServiceError::Validation("Type must be income or expense".to_string()))
    }
}

pub async fn list_transactions(
    db: &DbPool,
) -> Result<Vec<ledger_transaction::Model>, ServiceError> {
    ledger_transaction::Entity::find()
        .order_by_asc(ledger_transaction::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::from_db)
}

pub async fn create_transaction(
    db: &DbPool,
    input: TransactionInput,
) -> Result<ledger_transaction::Model, ServiceError> {
    let kind = input.kind()?;
    ledger_transaction::ActiveModel {
        id: NotSet,
        amount: Set(input.amount),
        r#type: Set(kind.to_string()),
        category: Set(input.category.filter(|c| !c.is_empty())),
        status: Set(input.status.unwrap_or_else(|| "completed".to_string())),
        description: Set(input.description.filter(|d| !d.is_empty())),
        payment_method_id: Set(None),
        order_id: Set(None),
        purchase_id: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .map_err(ServiceError::from_db)
}

pub async fn update_transaction(
    db: &DbPool,
    id: i32,
    input: TransactionInput,
) -> Result<ledger_transaction::Model, ServiceError> {
    let kind = input.kind()?;
    let existing = ledger_transaction::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::from_db)?
        .ok_or_else(|| ServiceError::NotFound("Transaction not found".to_string()))?;

    let mut model: ledger_transaction::ActiveModel = existing.into();
    model.amount = Set(input.amount);
    model.r#type = Set(kind.to_string());
    model.category = Set(input.category.filter(|c| !c.is_empty()));
    model.description = Set(input.description.filter(|d| !d.is_empty()));
    if let Some(status) = input.status {
        model.status = Set(status);
    }
    model.update(db).await.map_err(ServiceError::from_db)
}

pub async fn delete_transaction(db: &DbPool, id: i32) -> Result<(), ServiceError> {
    let existing = ledger_transaction::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::from_db)?
        .ok_or_else(|| ServiceError::NotFound("Transaction not found".to_string()))?;
    existing.delete(db).await.map_err(ServiceError::from_db)?;
    Ok(())
}
