use crate::{
    db::DbPool,
    entities::{
        ledger_transaction::{self, categories, LedgerKind},
        payable, product,
        purchase::{self, PaymentTerm},
        purchase_item,
        stock_movement::{self, MovementKind},
        supplier,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, LoaderTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use super::{parse_datetime_param, txn_err};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseRequest {
    pub supplier_id: i32,
    #[validate(length(min = 1, message = "No items provided"))]
    pub items: Vec<PurchaseLine>,
    #[serde(default)]
    pub payment_method_id: Option<i32>,
    #[serde(default = "default_payment_term")]
    pub payment_term: PaymentTerm,
    /// RFC 3339 or `YYYY-MM-DD`; only meaningful for credit purchases.
    #[serde(default)]
    pub due_date: Option<String>,
}

fn default_payment_term() -> PaymentTerm {
    PaymentTerm::Cash
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    pub product_id: i32,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierName {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseResponse {
    pub id: i32,
    pub supplier_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: String,
    pub payment_term: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub supplier: Option<SupplierName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<purchase_item::Model>>,
}

/// Purchase intake: stock increments, movement log and the cash/credit
/// payment split, all inside one transaction.
#[derive(Clone)]
pub struct PurchasingService {
    db: Arc<DbPool>,
}

impl PurchasingService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_purchases(&self) -> Result<Vec<PurchaseResponse>, ServiceError> {
        let purchases = purchase::Entity::find()
            .order_by_asc(purchase::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        let suppliers = purchases
            .load_one(supplier::Entity, self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        Ok(purchases
            .into_iter()
            .zip(suppliers)
            .map(|(purchase, supplier)| to_response(purchase, supplier, None))
            .collect())
    }

    #[instrument(skip(self, request), fields(supplier_id = request.supplier_id))]
    pub async fn create_purchase(
        &self,
        request: CreatePurchaseRequest,
    ) -> Result<PurchaseResponse, ServiceError> {
        request.validate()?;
        for item in &request.items {
            if item.product_id <= 0 || item.quantity <= 0 || item.price < Decimal::ZERO {
                return Err(ServiceError::Validation("Invalid item values".to_string()));
            }
        }

        let due_date = match request.due_date.as_deref() {
            Some(raw) => Some(parse_datetime_param(raw, "dueDate")?),
            None => None,
        };

        let supplier_row = supplier::Entity::find_by_id(request.supplier_id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?
            .ok_or_else(|| ServiceError::Validation("Invalid supplierId".to_string()))?;

        let total: Decimal = request
            .items
            .iter()
            .map(|item| Decimal::from(item.quantity) * item.price)
            .sum();

        let items = request.items.clone();
        let supplier_id = request.supplier_id;
        let payment_term = request.payment_term;
        let payment_method_id = request.payment_method_id;

        let purchase = self
            .db
            .transaction::<_, purchase::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let purchase = purchase::ActiveModel {
                        id: NotSet,
                        supplier_id: Set(supplier_id),
                        total_amount: Set(total),
                        status: Set("completed".to_string()),
                        payment_term: Set(payment_term.to_string()),
                        due_date: Set(due_date),
                        created_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::from_db)?;

                    for item in &items {
                        purchase_item::ActiveModel {
                            id: NotSet,
                            purchase_id: Set(purchase.id),
                            product_id: Set(item.product_id),
                            quantity: Set(item.quantity),
                            price: Set(item.price),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::from_db)?;

                        let result = product::Entity::update_many()
                            .col_expr(
                                product::Column::InStock,
                                Expr::col(product::Column::InStock).add(item.quantity),
                            )
                            .filter(product::Column::Id.eq(item.product_id))
                            .exec(txn)
                            .await
                            .map_err(ServiceError::from_db)?;
                        if result.rows_affected == 0 {
                            return Err(ServiceError::Validation(format!(
                                "Unknown product id {}",
                                item.product_id
                            )));
                        }

                        stock_movement::ActiveModel {
                            id: NotSet,
                            product_id: Set(item.product_id),
                            quantity: Set(item.quantity),
                            r#type: Set(MovementKind::Purchase.to_string()),
                            order_id: Set(None),
                            purchase_id: Set(Some(purchase.id)),
                            adjustment_id: Set(None),
                            unit_cost: Set(Some(item.price)),
                            created_at: Set(now),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::from_db)?;
                    }

                    match payment_term {
                        PaymentTerm::Cash => {
                            ledger_transaction::ActiveModel {
                                id: NotSet,
                                amount: Set(total),
                                r#type: Set(LedgerKind::Expense.to_string()),
                                category: Set(Some(categories::PURCHASE.to_string())),
                                status: Set("completed".to_string()),
                                description: Set(Some(format!("Compra #{}", purchase.id))),
                                payment_method_id: Set(payment_method_id),
                                order_id: Set(None),
                                purchase_id: Set(Some(purchase.id)),
                                created_at: Set(now),
                            }
                            .insert(txn)
                            .await
                            .map_err(ServiceError::from_db)?;
                        }
                        PaymentTerm::Credit => {
                            payable::ActiveModel {
                                id: NotSet,
                                supplier_id: Set(supplier_id),
                                purchase_id: Set(Some(purchase.id)),
                                amount: Set(total),
                                balance: Set(total),
                                status: Set("open".to_string()),
                                due_date: Set(due_date),
                                created_at: Set(now),
                            }
                            .insert(txn)
                            .await
                            .map_err(ServiceError::from_db)?;
                        }
                    }

                    Ok(purchase)
                })
            })
            .await
            .map_err(txn_err)?;

        info!(
            purchase_id = purchase.id,
            total = %purchase.total_amount,
            term = %purchase.payment_term,
            "purchase intake settled"
        );

        let items = purchase_item::Entity::find()
            .filter(purchase_item::Column::PurchaseId.eq(purchase.id))
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        Ok(to_response(purchase, Some(supplier_row), Some(items)))
    }
}

fn to_response(
    purchase: purchase::Model,
    supplier: Option<supplier::Model>,
    items: Option<Vec<purchase_item::Model>>,
) -> PurchaseResponse {
    PurchaseResponse {
        id: purchase.id,
        supplier_id: purchase.supplier_id,
        total_amount: purchase.total_amount,
        status: purchase.status,
        payment_term: purchase.payment_term,
        due_date: purchase.due_date,
        created_at: purchase.created_at,
        supplier: supplier.map(|s| SupplierName { name: s.name }),
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn total_is_sum_of_quantity_times_price() {
        let items = [
            PurchaseLine {
                product_id: 1,
                quantity: 10,
                price: dec!(5.00),
            },
            PurchaseLine {
                product_id: 2,
                quantity: 3,
                price: dec!(1.25),
            },
        ];
        let total: Decimal = items
            .iter()
            .map(|item| Decimal::from(item.quantity) * item.price)
            .sum();
        assert_eq!(total, dec!(53.75));
    }

    #[test]
    fn payment_term_defaults_to_cash() {
        let raw = serde_json::json!({
            "supplierId": 1,
            "items": [{"productId": 1, "quantity": 1, "price": 2.0}]
        });
        let parsed: CreatePurchaseRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.payment_term, PaymentTerm::Cash);
    }
}
