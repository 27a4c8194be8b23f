use crate::{
    db::DbPool,
    entities::{
        ledger_transaction::{self, categories, LedgerKind},
        payable, payable_payment, supplier,
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, LoaderTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use super::purchasing::SupplierName;
use super::txn_err;

/// Balances at or below this are considered settled; a strict zero check
/// would strand payables on rounding residue.
const SETTLEMENT_EPSILON: Decimal = dec!(0.01);

pub mod status {
    pub const OPEN: &str = "open";
    pub const PAID: &str = "paid";
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayablePaymentRequest {
    pub payable_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(default)]
    pub payment_method_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseRef {
    pub id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PayableResponse {
    pub id: i32,
    pub supplier_id: i32,
    pub purchase_id: Option<i32>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub supplier: Option<SupplierName>,
    pub purchase: Option<PurchaseRef>,
    pub payments: Vec<payable_payment::Model>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResult {
    pub payment: payable_payment::Model,
    pub payable: PayableResponse,
}

/// Payable settlement: balance recomputation plus the optional expense
/// ledger row, one transaction per payment.
#[derive(Clone)]
pub struct PayableService {
    db: Arc<DbPool>,
}

impl PayableService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_payables(&self) -> Result<Vec<PayableResponse>, ServiceError> {
        let payables = payable::Entity::find()
            .order_by_desc(payable::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        let suppliers = payables
            .load_one(supplier::Entity, self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;
        let payments = payables
            .load_many(payable_payment::Entity, self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        Ok(payables
            .into_iter()
            .zip(suppliers)
            .zip(payments)
            .map(|((payable, supplier), payments)| to_response(payable, supplier, payments))
            .collect())
    }

    /// Apply a payment against an open payable.
    ///
    /// Rejects non-positive amounts and overpayment (no partial
    /// overpayment is allowed); flips status to "paid" once the balance
    /// reaches the settlement epsilon.
    #[instrument(skip(self, request), fields(payable_id = request.payable_id))]
    pub async fn settle_payment(
        &self,
        request: PayablePaymentRequest,
    ) -> Result<PaymentResult, ServiceError> {
        if request.amount <= Decimal::ZERO {
            return Err(ServiceError::Validation(
                "Invalid payableId or amount".to_string(),
            ));
        }

        let (payment, updated) = self
            .db
            .transaction::<_, (payable_payment::Model, payable::Model), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let current = payable::Entity::find_by_id(request.payable_id)
                            .one(txn)
                            .await
                            .map_err(ServiceError::from_db)?
                            .ok_or_else(|| {
                                ServiceError::NotFound("Payable not found".to_string())
                            })?;

                        if request.amount > current.balance {
                            return Err(ServiceError::Conflict(
                                "Payment amount exceeds balance".to_string(),
                            ));
                        }

                        let now = Utc::now();
                        let payment = payable_payment::ActiveModel {
                            id: NotSet,
                            payable_id: Set(current.id),
                            amount: Set(request.amount),
                            paid_at: Set(now),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::from_db)?;

                        let (new_balance, new_status) =
                            apply_payment(current.balance, request.amount);

                        let mut model: payable::ActiveModel = current.into();
                        model.balance = Set(new_balance);
                        model.status = Set(new_status.to_string());
                        let updated = model
                            .update(txn)
                            .await
                            .map_err(ServiceError::from_db)?;

                        if let Some(payment_method_id) = request.payment_method_id {
                            let supplier_name = supplier::Entity::find_by_id(updated.supplier_id)
                                .one(txn)
                                .await
                                .map_err(ServiceError::from_db)?
                                .map(|s| s.name)
                                .unwrap_or_default();

                            ledger_transaction::ActiveModel {
                                id: NotSet,
                                amount: Set(request.amount),
                                r#type: Set(LedgerKind::Expense.to_string()),
                                category: Set(Some(categories::PAYABLE_PAYMENT.to_string())),
                                status: Set("completed".to_string()),
                                description: Set(Some(format!(
                                    "Pago CxP #{} - {}",
                                    updated.id, supplier_name
                                ))),
                                payment_method_id: Set(Some(payment_method_id)),
                                order_id: Set(None),
                                purchase_id: Set(None),
                                created_at: Set(now),
                            }
                            .insert(txn)
                            .await
                            .map_err(ServiceError::from_db)?;
                        }

                        Ok((payment, updated))
                    })
                },
            )
            .await
            .map_err(txn_err)?;

        info!(
            payable_id = updated.id,
            balance = %updated.balance,
            status = %updated.status,
            "payable payment settled"
        );

        let supplier = supplier::Entity::find_by_id(updated.supplier_id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;
        let payments = payable_payment::Entity::find()
            .filter(payable_payment::Column::PayableId.eq(updated.id))
            .order_by_asc(payable_payment::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        Ok(PaymentResult {
            payment,
            payable: to_response(updated, supplier, payments),
        })
    }
}

/// Pure balance transition: `balance - amount`, flipping to "paid" at the
/// settlement epsilon. Callers must have rejected overpayment already.
fn apply_payment(balance: Decimal, amount: Decimal) -> (Decimal, &'static str) {
    let new_balance = balance - amount;
    let new_status = if new_balance <= SETTLEMENT_EPSILON {
        status::PAID
    } else {
        status::OPEN
    };
    (new_balance, new_status)
}

fn to_response(
    payable: payable::Model,
    supplier: Option<supplier::Model>,
    payments: Vec<payable_payment::Model>,
) -> PayableResponse {
    PayableResponse {
        id: payable.id,
        supplier_id: payable.supplier_id,
        purchase_id: payable.purchase_id,
        amount: payable.amount,
        balance: payable.balance,
        status: payable.status,
        due_date: payable.due_date,
        created_at: payable.created_at,
        supplier: supplier.map(|s| SupplierName { name: s.name }),
        purchase: payable.purchase_id.map(|id| PurchaseRef { id }),
        payments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_payoff_reaches_paid() {
        let (balance, status) = apply_payment(dec!(100.00), dec!(100.00));
        assert_eq!(balance, dec!(0.00));
        assert_eq!(status, "paid");
    }

    #[test]
    fn residue_within_epsilon_counts_as_paid() {
        let (balance, status) = apply_payment(dec!(50.00), dec!(49.99));
        assert_eq!(balance, dec!(0.01));
        assert_eq!(status, "paid");
    }

    #[test]
    fn partial_payment_stays_open() {
        let (balance, status) = apply_payment(dec!(100.00), dec!(40.00));
        assert_eq!(balance, dec!(60.00));
        assert_eq!(status, "open");
    }

    #[test]
    fn balance_above_epsilon_stays_open() {
        let (balance, status) = apply_payment(dec!(50.00), dec!(49.98));
        assert_eq!(balance, dec!(0.02));
        assert_eq!(status, "open");
    }
}
