use crate::{
    db::DbPool,
    entities::{
        customer,
        ledger_transaction::{self, categories, LedgerKind},
        order, order_item,
        product,
        stock_movement::{self, MovementKind},
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
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use super::txn_err;

/// Order creation request, dispatched on an explicit `kind` tag rather
/// than on payload shape.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CreateOrderRequest {
    /// POS checkout: validates stock, decrements it and writes the audit
    /// and ledger rows in one transaction.
    PosSale(PosSaleRequest),
    /// Back-office order row with no stock or ledger side effects.
    ManualOrder(ManualOrderRequest),
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PosSaleRequest {
    pub customer_id: Option<i32>,
    pub payment_method_id: Option<i32>,
    #[validate(length(min = 1, message = "At least one line item is required"))]
    pub products: Vec<SaleLine>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Informational only; echoed into the ledger description.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cash_received: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub change: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleLine {
    pub product_id: i32,
    pub quantity: i32,
    /// Price snapshot the register showed at checkout time.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ManualOrderRequest {
    pub customer_id: Option<i32>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total_amount: Option<Decimal>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerName {
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub customer_id: Option<i32>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub customer: Option<CustomerName>,
}

/// Sale settlement and plain order CRUD.
#[derive(Clone)]
pub struct SalesService {
    db: Arc<DbPool>,
}

impl SalesService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        match request {
            CreateOrderRequest::PosSale(sale) => self.settle_pos_sale(sale).await,
            CreateOrderRequest::ManualOrder(manual) => self.create_manual_order(manual).await,
        }
    }

    /// POS checkout. One transaction covering the stock check, order and
    /// item rows, the guarded stock decrements, the movement log and the
    /// income ledger row; any failure rolls the whole settlement back.
    async fn settle_pos_sale(&self, request: PosSaleRequest) -> Result<OrderResponse, ServiceError> {
        request.validate()?;
        for line in &request.products {
            if line.quantity <= 0 {
                return Err(ServiceError::Validation(
                    "Line quantity must be positive".to_string(),
                ));
            }
        }

        let order = self
            .db
            .transaction::<_, order::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    // Snapshot stock for every referenced product in one query.
                    let ids: Vec<i32> = request.products.iter().map(|l| l.product_id).collect();
                    let products = product::Entity::find()
                        .filter(product::Column::Id.is_in(ids))
                        .all(txn)
                        .await
                        .map_err(ServiceError::from_db)?;
                    let by_id: HashMap<i32, &product::Model> =
                        products.iter().map(|p| (p.id, p)).collect();

                    for line in &request.products {
                        let snapshot = by_id.get(&line.product_id).ok_or_else(|| {
                            ServiceError::Validation(format!(
                                "Unknown product id {}",
                                line.product_id
                            ))
                        })?;
                        if snapshot.in_stock < line.quantity {
                            return Err(ServiceError::InsufficientStock(snapshot.name.clone()));
                        }
                    }

                    let now = Utc::now();
                    let order = order::ActiveModel {
                        id: NotSet,
                        customer_id: Set(request.customer_id),
                        total_amount: Set(request.total),
                        status: Set("completed".to_string()),
                        created_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::from_db)?;

                    for line in &request.products {
                        order_item::ActiveModel {
                            id: NotSet,
                            order_id: Set(order.id),
                            product_id: Set(line.product_id),
                            quantity: Set(line.quantity),
                            price: Set(line.price),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::from_db)?;

                        // Guarded decrement: the snapshot check above is
                        // advisory only; this conditional update is what
                        // actually keeps concurrent sales from overselling.
                        let result = product::Entity::update_many()
                            .col_expr(
                                product::Column::InStock,
                                Expr::col(product::Column::InStock).sub(line.quantity),
                            )
                            .filter(product::Column::Id.eq(line.product_id))
                            .filter(product::Column::InStock.gte(line.quantity))
                            .exec(txn)
                            .await
                            .map_err(ServiceError::from_db)?;
                        if result.rows_affected == 0 {
                            let name = by_id
                                .get(&line.product_id)
                                .map(|p| p.name.clone())
                                .unwrap_or_else(|| line.product_id.to_string());
                            return Err(ServiceError::InsufficientStock(name));
                        }

                        stock_movement::ActiveModel {
                            id: NotSet,
                            product_id: Set(line.product_id),
                            quantity: Set(-line.quantity),
                            r#type: Set(MovementKind::Sale.to_string()),
                            order_id: Set(Some(order.id)),
                            purchase_id: Set(None),
                            adjustment_id: Set(None),
                            unit_cost: Set(None),
                            created_at: Set(now),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::from_db)?;
                    }

                    let mut description = format!("Pago del pedido #{}", order.id);
                    if let Some(cash) = request.cash_received {
                        description.push_str(&format!(" | Efectivo: ${}", cash.round_dp(2)));
                    }
                    if let Some(change) = request.change {
                        description.push_str(&format!(" | Cambio: ${}", change.round_dp(2)));
                    }

                    ledger_transaction::ActiveModel {
                        id: NotSet,
                        amount: Set(request.total),
                        r#type: Set(LedgerKind::Income.to_string()),
                        category: Set(Some(categories::SELLING.to_string())),
                        status: Set("completed".to_string()),
                        description: Set(Some(description)),
                        payment_method_id: Set(request.payment_method_id),
                        order_id: Set(Some(order.id)),
                        purchase_id: Set(None),
                        created_at: Set(now),
                    }
                    .insert(txn)
                    .await
                    .map_err(ServiceError::from_db)?;

                    Ok(order)
                })
            })
            .await
            .map_err(txn_err)?;

        info!(order_id = order.id, total = %order.total_amount, "POS sale settled");
        self.order_with_customer(order).await
    }

    async fn create_manual_order(
        &self,
        request: ManualOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let order = order::ActiveModel {
            id: NotSet,
            customer_id: Set(request.customer_id),
            total_amount: Set(request.total_amount.unwrap_or(Decimal::ZERO)),
            status: Set(request.status.unwrap_or_else(|| "pending".to_string())),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(ServiceError::from_db)?;

        self.order_with_customer(order).await
    }

    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderResponse>, ServiceError> {
        let orders = order::Entity::find()
            .order_by_asc(order::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        let customers = orders
            .load_one(customer::Entity, self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        Ok(orders
            .into_iter()
            .zip(customers)
            .map(|(order, customer)| to_response(order, customer))
            .collect())
    }

    #[instrument(skip(self, request), fields(order_id = id))]
    pub async fn update_order(
        &self,
        id: i32,
        request: UpdateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let existing = order::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let mut model: order::ActiveModel = existing.into();
        if let Some(total) = request.total_amount {
            model.total_amount = Set(total);
        }
        if let Some(status) = request.status {
            model.status = Set(status);
        }

        let updated = model
            .update(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;
        self.order_with_customer(updated).await
    }

    /// Deletes an order and its line items. Orders referenced by the
    /// ledger or the movement log are protected by foreign keys and
    /// surface as a conflict.
    #[instrument(skip(self), fields(order_id = id))]
    pub async fn delete_order(&self, id: i32) -> Result<(), ServiceError> {
        let existing = order::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    order_item::Entity::delete_many()
                        .filter(order_item::Column::OrderId.eq(existing.id))
                        .exec(txn)
                        .await
                        .map_err(ServiceError::from_db)?;
                    order::Entity::delete_by_id(existing.id)
                        .exec(txn)
                        .await
                        .map_err(ServiceError::from_db)?;
                    Ok(())
                })
            })
            .await
            .map_err(txn_err)
    }

    async fn order_with_customer(&self, order: order::Model) -> Result<OrderResponse, ServiceError> {
        let customer = match order.customer_id {
            Some(customer_id) => customer::Entity::find_by_id(customer_id)
                .one(self.db.as_ref())
                .await
                .map_err(ServiceError::from_db)?,
            None => None,
        };
        Ok(to_response(order, customer))
    }
}

fn to_response(order: order::Model, customer: Option<customer::Model>) -> OrderResponse {
    OrderResponse {
        id: order.id,
        customer_id: order.customer_id,
        total_amount: order.total_amount,
        status: order.status,
        created_at: order.created_at,
        customer: customer.map(|c| CustomerName { name: c.name }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_request_dispatches_on_kind() {
        let raw = serde_json::json!({
            "kind": "pos_sale",
            "products": [{"product_id": 1, "quantity": 2, "price": 10.5}],
            "total": 21.0
        });
        let parsed: CreateOrderRequest = serde_json::from_value(raw).unwrap();
        match parsed {
            CreateOrderRequest::PosSale(sale) => {
                assert_eq!(sale.products.len(), 1);
                assert_eq!(sale.products[0].quantity, 2);
            }
            CreateOrderRequest::ManualOrder(_) => panic!("expected pos_sale"),
        }

        let raw = serde_json::json!({ "kind": "manual_order", "total_amount": 5.0 });
        let parsed: CreateOrderRequest = serde_json::from_value(raw).unwrap();
        assert!(matches!(parsed, CreateOrderRequest::ManualOrder(_)));
    }

    #[test]
    fn untagged_payload_is_rejected() {
        let raw = serde_json::json!({
            "products": [{"product_id": 1, "quantity": 2, "price": 10.5}],
            "total": 21.0
        });
        assert!(serde_json::from_value::<CreateOrderRequest>(raw).is_err());
    }
}
