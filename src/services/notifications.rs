use crate::{
    db::DbPool,
    entities::{payable, product, supplier},
    errors::ServiceError,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, LoaderTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Notification {
    pub id: String,
    pub r#type: String,
    pub priority: String,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationSummary {
    pub low_stock_count: usize,
    pub overdue_payables_count: usize,
    pub due_soon_payables_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
    pub summary: NotificationSummary,
}

/// Request-time alerts: low stock and payables coming due. Nothing is
/// persisted or deduplicated; every call recomputes from current rows.
#[derive(Clone)]
pub struct NotificationService {
    db: Arc<DbPool>,
}

impl NotificationService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn build(
        &self,
        low_stock_threshold: i32,
        due_soon_days: i64,
    ) -> Result<NotificationsResponse, ServiceError> {
        let now = Utc::now();

        let low_stock = product::Entity::find()
            .filter(product::Column::InStock.lte(low_stock_threshold))
            .order_by_asc(product::Column::InStock)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        let open_payables = payable::Entity::find()
            .filter(payable::Column::Status.eq("open"))
            .filter(payable::Column::Balance.gt(Decimal::ZERO))
            .filter(payable::Column::DueDate.is_not_null())
            .order_by_asc(payable::Column::DueDate)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;
        let suppliers = open_payables
            .load_one(supplier::Entity, self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        let due_limit = now + Duration::days(due_soon_days);
        let mut notifications = Vec::new();
        let mut overdue_count = 0;
        let mut due_soon_count = 0;

        for p in &low_stock {
            notifications.push(Notification {
                id: format!("stock_{}", p.id),
                r#type: "low_stock".to_string(),
                priority: stock_priority(p.in_stock).to_string(),
                title: if p.in_stock == 0 {
                    "Producto sin stock".to_string()
                } else {
                    "Stock bajo".to_string()
                },
                message: format!("{}: {} unidades disponibles", p.name, p.in_stock),
                data: json!({
                    "id": p.id,
                    "name": p.name,
                    "in_stock": p.in_stock,
                    "category": p.category,
                }),
                created_at: now,
            });
        }

        for (p, s) in open_payables.iter().zip(suppliers.iter()) {
            let Some(due_date) = p.due_date else { continue };
            let supplier_name = s.as_ref().map(|s| s.name.as_str()).unwrap_or("");
            let balance = p.balance.round_dp(2);

            if due_date < now {
                overdue_count += 1;
                notifications.push(Notification {
                    id: format!("overdue_{}", p.id),
                    r#type: "payable_overdue".to_string(),
                    priority: "high".to_string(),
                    title: "Cuenta por pagar vencida".to_string(),
                    message: format!(
                        "{}: {} vencido desde {}",
                        supplier_name,
                        balance,
                        due_date.date_naive()
                    ),
                    data: payable_data(p, supplier_name, None),
                    created_at: now,
                });
            } else if due_date <= due_limit {
                due_soon_count += 1;
                let days_until_due = days_until(now, due_date);
                notifications.push(Notification {
                    id: format!("due_{}", p.id),
                    r#type: "payable_due_soon".to_string(),
                    priority: if days_until_due <= 2 { "high" } else { "medium" }.to_string(),
                    title: "Cuenta por pagar próxima a vencer".to_string(),
                    message: format!(
                        "{}: {} vence en {} días",
                        supplier_name, balance, days_until_due
                    ),
                    data: payable_data(p, supplier_name, Some(days_until_due)),
                    created_at: now,
                });
            }
        }

        notifications.sort_by(|a, b| {
            priority_rank(&b.priority)
                .cmp(&priority_rank(&a.priority))
                .then(b.created_at.cmp(&a.created_at))
        });

        let summary = NotificationSummary {
            low_stock_count: low_stock.len(),
            overdue_payables_count: overdue_count,
            due_soon_payables_count: due_soon_count,
            total_count: notifications.len(),
        };

        Ok(NotificationsResponse {
            notifications,
            summary,
        })
    }
}

fn payable_data(p: &payable::Model, supplier_name: &str, days_until_due: Option<i64>) -> serde_json::Value {
    use rust_decimal::prelude::ToPrimitive;
    let mut data = json!({
        "id": p.id,
        "supplier_id": p.supplier_id,
        "purchase_id": p.purchase_id,
        "amount": p.amount.to_f64().unwrap_or(0.0),
        "balance": p.balance.to_f64().unwrap_or(0.0),
        "status": p.status,
        "due_date": p.due_date,
        "supplier": { "name": supplier_name },
    });
    if let Some(days) = days_until_due {
        data["days_until_due"] = json!(days);
    }
    data
}

fn stock_priority(in_stock: i32) -> &'static str {
    if in_stock == 0 {
        "high"
    } else if in_stock <= 3 {
        "medium"
    } else {
        "low"
    }
}

fn priority_rank(priority: &str) -> u8 {
    match priority {
        "high" => 3,
        "medium" => 2,
        _ => 1,
    }
}

/// Whole days until `due`, rounded up so a payable due later today still
/// counts as one day out.
fn days_until(now: DateTime<Utc>, due: DateTime<Utc>) -> i64 {
    let secs = (due - now).num_seconds();
    if secs <= 0 {
        0
    } else {
        (secs + 86_399) / 86_400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_priority_bands() {
        assert_eq!(stock_priority(0), "high");
        assert_eq!(stock_priority(1), "medium");
        assert_eq!(stock_priority(3), "medium");
        assert_eq!(stock_priority(4), "low");
    }

    #[test]
    fn priority_ordering() {
        assert!(priority_rank("high") > priority_rank("medium"));
        assert!(priority_rank("medium") > priority_rank("low"));
    }

    #[test]
    fn days_until_rounds_up() {
        let now = Utc::now();
        assert_eq!(days_until(now, now + Duration::hours(1)), 1);
        assert_eq!(days_until(now, now + Duration::days(2)), 2);
        assert_eq!(days_until(now, now - Duration::hours(1)), 0);
    }
}
