use crate::{
    db::DbPool,
    entities::{
        inventory_adjustment, inventory_adjustment_item, product,
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
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use super::{parse_datetime_param, txn_err};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdjustmentRequest {
    #[serde(default)]
    pub reason: Option<String>,
    pub items: Vec<AdjustmentLine>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentLine {
    pub product_id: i32,
    /// Signed delta; zero entries are dropped during normalization.
    pub quantity: i32,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdjustmentResponse {
    pub id: i32,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<inventory_adjustment_item::Model>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MovementFilter {
    pub product_id: Option<i32>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductRef {
    pub name: String,
    pub barcode: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementResponse {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub r#type: String,
    pub order_id: Option<i32>,
    pub purchase_id: Option<i32>,
    pub adjustment_id: Option<i32>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub unit_cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub product: Option<ProductRef>,
}

/// Manual adjustments and the Kardex read side of the movement log.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_adjustments(&self) -> Result<Vec<AdjustmentResponse>, ServiceError> {
        let adjustments = inventory_adjustment::Entity::find()
            .order_by_desc(inventory_adjustment::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        let items = adjustments
            .load_many(inventory_adjustment_item::Entity, self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        Ok(adjustments
            .into_iter()
            .zip(items)
            .map(|(adjustment, items)| AdjustmentResponse {
                id: adjustment.id,
                reason: adjustment.reason,
                created_at: adjustment.created_at,
                items,
            })
            .collect())
    }

    /// Apply a batch of signed stock deltas.
    ///
    /// Entries with a non-positive product id or zero quantity are dropped;
    /// a request whose every entry drops out is rejected with nothing
    /// written. Deltas apply directly to `in_stock` with no floor — unlike
    /// sales, an adjustment may drive stock negative. Not a financial
    /// event: no ledger row is written.
    #[instrument(skip(self, request))]
    pub async fn create_adjustment(
        &self,
        request: CreateAdjustmentRequest,
    ) -> Result<AdjustmentResponse, ServiceError> {
        if request.items.is_empty() {
            return Err(ServiceError::Validation("No items provided".to_string()));
        }

        let items = normalize_items(request.items);
        if items.is_empty() {
            return Err(ServiceError::Validation("Invalid item values".to_string()));
        }

        let reason = request.reason.filter(|r| !r.trim().is_empty());

        let (adjustment, rows) = self
            .db
            .transaction::<_, (inventory_adjustment::Model, Vec<inventory_adjustment_item::Model>), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let now = Utc::now();
                        let adjustment = inventory_adjustment::ActiveModel {
                            id: NotSet,
                            reason: Set(reason),
                            created_at: Set(now),
                        }
                        .insert(txn)
                        .await
                        .map_err(ServiceError::from_db)?;

                        let mut rows = Vec::with_capacity(items.len());
                        for item in &items {
                            let row = inventory_adjustment_item::ActiveModel {
                                id: NotSet,
                                adjustment_id: Set(adjustment.id),
                                product_id: Set(item.product_id),
                                quantity: Set(item.quantity),
                                note: Set(item.note.clone()),
                            }
                            .insert(txn)
                            .await
                            .map_err(ServiceError::from_db)?;
                            rows.push(row);

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
                                r#type: Set(MovementKind::Adjustment.to_string()),
                                order_id: Set(None),
                                purchase_id: Set(None),
                                adjustment_id: Set(Some(adjustment.id)),
                                unit_cost: Set(None),
                                created_at: Set(now),
                            }
                            .insert(txn)
                            .await
                            .map_err(ServiceError::from_db)?;
                        }

                        Ok((adjustment, rows))
                    })
                },
            )
            .await
            .map_err(txn_err)?;

        info!(
            adjustment_id = adjustment.id,
            items = rows.len(),
            "inventory adjustment applied"
        );

        Ok(AdjustmentResponse {
            id: adjustment.id,
            reason: adjustment.reason,
            created_at: adjustment.created_at,
            items: rows,
        })
    }

    /// Kardex: filtered, newest-first read over the movement log with the
    /// product name/barcode joined in.
    #[instrument(skip(self))]
    pub async fn list_movements(
        &self,
        filter: MovementFilter,
    ) -> Result<Vec<MovementResponse>, ServiceError> {
        let mut query = stock_movement::Entity::find();

        if let Some(product_id) = filter.product_id {
            query = query.filter(stock_movement::Column::ProductId.eq(product_id));
        }
        if let Some(raw) = filter.from.as_deref() {
            let from = parse_datetime_param(raw, "from")?;
            query = query.filter(stock_movement::Column::CreatedAt.gte(from));
        }
        if let Some(raw) = filter.to.as_deref() {
            let to = parse_datetime_param(raw, "to")?;
            query = query.filter(stock_movement::Column::CreatedAt.lte(to));
        }
        if let Some(raw) = filter.kind.as_deref() {
            let kind = MovementKind::from_str(raw)
                .map_err(|_| ServiceError::Validation("Invalid movement type".to_string()))?;
            query = query.filter(stock_movement::Column::Type.eq(kind.to_string()));
        }

        let movements = query
            .order_by_desc(stock_movement::Column::CreatedAt)
            .order_by_desc(stock_movement::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        let products = movements
            .load_one(product::Entity, self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        Ok(movements
            .into_iter()
            .zip(products)
            .map(|(movement, product)| MovementResponse {
                id: movement.id,
                product_id: movement.product_id,
                quantity: movement.quantity,
                r#type: movement.r#type,
                order_id: movement.order_id,
                purchase_id: movement.purchase_id,
                adjustment_id: movement.adjustment_id,
                unit_cost: movement.unit_cost,
                created_at: movement.created_at,
                product: product.map(|p| ProductRef {
                    name: p.name,
                    barcode: p.barcode,
                }),
            })
            .collect())
    }
}

/// Drop entries that cannot represent a real delta.
fn normalize_items(items: Vec<AdjustmentLine>) -> Vec<AdjustmentLine> {
    items
        .into_iter()
        .filter(|item| item.product_id > 0 && item.quantity != 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i32, quantity: i32) -> AdjustmentLine {
        AdjustmentLine {
            product_id,
            quantity,
            note: None,
        }
    }

    #[test]
    fn zero_deltas_are_dropped() {
        let survivors = normalize_items(vec![line(1, 0), line(2, 0)]);
        assert!(survivors.is_empty());
    }

    #[test]
    fn only_valid_items_survive() {
        let survivors = normalize_items(vec![line(1, 0), line(2, -3), line(0, 5), line(3, 4)]);
        assert_eq!(survivors.len(), 2);
        assert_eq!(survivors[0].product_id, 2);
        assert_eq!(survivors[0].quantity, -3);
        assert_eq!(survivors[1].product_id, 3);
    }

    #[test]
    fn movement_kind_parsing() {
        assert_eq!(MovementKind::from_str("sale").unwrap(), MovementKind::Sale);
        assert_eq!(
            MovementKind::from_str("adjustment").unwrap(),
            MovementKind::Adjustment
        );
        assert!(MovementKind::from_str("teleport").is_err());
    }
}
