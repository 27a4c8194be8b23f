use crate::{
    db::DbPool,
    entities::ledger_transaction::{self, categories, LedgerKind},
    errors::ServiceError,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueTotal {
    #[serde(rename = "totalRevenue")]
    pub total_revenue: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueByCategory {
    #[serde(rename = "revenueByCategory")]
    pub revenue_by_category: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExpensesTotal {
    #[serde(rename = "totalExpenses")]
    pub total_expenses: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ExpensesByCategory {
    #[serde(rename = "expensesByCategory")]
    pub expenses_by_category: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfitTotal {
    #[serde(rename = "totalProfit")]
    pub total_profit: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarginPoint {
    pub date: String,
    pub margin: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfitMargin {
    #[serde(rename = "profitMargin")]
    pub profit_margin: Vec<MarginPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CashFlow {
    #[serde(rename = "cashFlow")]
    pub cash_flow: BTreeMap<String, f64>,
}

/// Read-only aggregations over completed ledger rows. No state of its own;
/// each report re-derives from the ledger on every request.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    async fn completed_transactions(
        &self,
    ) -> Result<Vec<ledger_transaction::Model>, ServiceError> {
        ledger_transaction::Entity::find()
            .filter(ledger_transaction::Column::Status.eq("completed"))
            .order_by_asc(ledger_transaction::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)
    }

    #[instrument(skip(self))]
    pub async fn revenue_total(&self) -> Result<RevenueTotal, ServiceError> {
        let rows = self.completed_transactions().await?;
        Ok(RevenueTotal {
            total_revenue: to_f64(sum_by_kind(&rows, LedgerKind::Income)),
        })
    }

    #[instrument(skip(self))]
    pub async fn revenue_by_category(&self) -> Result<RevenueByCategory, ServiceError> {
        let rows = self.completed_transactions().await?;
        Ok(RevenueByCategory {
            revenue_by_category: by_category(&rows, LedgerKind::Income),
        })
    }

    #[instrument(skip(self))]
    pub async fn expenses_total(&self) -> Result<ExpensesTotal, ServiceError> {
        let rows = self.completed_transactions().await?;
        Ok(ExpensesTotal {
            total_expenses: to_f64(sum_by_kind(&rows, LedgerKind::Expense)),
        })
    }

    #[instrument(skip(self))]
    pub async fn expenses_by_category(&self) -> Result<ExpensesByCategory, ServiceError> {
        let rows = self.completed_transactions().await?;
        Ok(ExpensesByCategory {
            expenses_by_category: by_category(&rows, LedgerKind::Expense),
        })
    }

    #[instrument(skip(self))]
    pub async fn profit_total(&self) -> Result<ProfitTotal, ServiceError> {
        let rows = self.completed_transactions().await?;
        let selling: Decimal = rows
            .iter()
            .filter(|t| t.category.as_deref() == Some(categories::SELLING))
            .map(|t| t.amount)
            .sum();
        let expenses = sum_by_kind(&rows, LedgerKind::Expense);
        Ok(ProfitTotal {
            total_profit: to_f64(selling - expenses),
        })
    }

    #[instrument(skip(self))]
    pub async fn profit_margin(&self) -> Result<ProfitMargin, ServiceError> {
        let rows = self.completed_transactions().await?;
        Ok(ProfitMargin {
            profit_margin: margin_series(&rows),
        })
    }

    #[instrument(skip(self))]
    pub async fn cash_flow(&self) -> Result<CashFlow, ServiceError> {
        let rows = self.completed_transactions().await?;
        let mut daily: BTreeMap<String, Decimal> = BTreeMap::new();
        for row in &rows {
            *daily
                .entry(row.created_at.date_naive().to_string())
                .or_insert(Decimal::ZERO) += row.amount;
        }
        Ok(CashFlow {
            cash_flow: daily.into_iter().map(|(k, v)| (k, to_f64(v))).collect(),
        })
    }
}

fn sum_by_kind(rows: &[ledger_transaction::Model], kind: LedgerKind) -> Decimal {
    let kind = kind.to_string();
    rows.iter()
        .filter(|t| t.r#type == kind)
        .map(|t| t.amount)
        .sum()
}

/// Per-category sums for one ledger direction; rows without a category
/// are skipped.
fn by_category(rows: &[ledger_transaction::Model], kind: LedgerKind) -> BTreeMap<String, f64> {
    let kind = kind.to_string();
    let mut acc: BTreeMap<String, Decimal> = BTreeMap::new();
    for row in rows.iter().filter(|t| t.r#type == kind) {
        let Some(category) = row.category.as_deref() else {
            continue;
        };
        *acc.entry(category.to_string()).or_insert(Decimal::ZERO) += row.amount;
    }
    acc.into_iter().map(|(k, v)| (k, to_f64(v))).collect()
}

/// Daily margin series: margin = (selling - expense) / selling * 100,
/// rounded to two decimals, zero on days with no selling income.
fn margin_series(rows: &[ledger_transaction::Model]) -> Vec<MarginPoint> {
    let mut daily: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for row in rows {
        let entry = daily
            .entry(row.created_at.date_naive().to_string())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        if row.category.as_deref() == Some(categories::SELLING) {
            entry.0 += row.amount;
        } else if row.r#type == LedgerKind::Expense.to_string() {
            entry.1 += row.amount;
        }
    }

    daily
        .into_iter()
        .map(|(date, (selling, expense))| {
            let margin = if selling > Decimal::ZERO {
                ((selling - expense) / selling * Decimal::from(100)).round_dp(2)
            } else {
                Decimal::ZERO
            };
            MarginPoint {
                date,
                margin: to_f64(margin),
            }
        })
        .collect()
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn tx(
        day: u32,
        amount: Decimal,
        kind: LedgerKind,
        category: Option<&str>,
    ) -> ledger_transaction::Model {
        ledger_transaction::Model {
            id: 0,
            amount,
            r#type: kind.to_string(),
            category: category.map(str::to_string),
            status: "completed".to_string(),
            description: None,
            payment_method_id: None,
            order_id: None,
            purchase_id: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn margin_is_zero_without_selling_income() {
        let rows = vec![tx(1, dec!(40.00), LedgerKind::Expense, Some("purchase"))];
        let series = margin_series(&rows);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].margin, 0.0);
    }

    #[test]
    fn margin_formula_per_day() {
        let rows = vec![
            tx(1, dec!(200.00), LedgerKind::Income, Some("selling")),
            tx(1, dec!(50.00), LedgerKind::Expense, Some("purchase")),
            tx(2, dec!(100.00), LedgerKind::Income, Some("selling")),
        ];
        let series = margin_series(&rows);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, "2024-03-01");
        assert_eq!(series[0].margin, 75.0);
        assert_eq!(series[1].margin, 100.0);
    }

    #[test]
    fn category_sums_skip_uncategorized_rows() {
        let rows = vec![
            tx(1, dec!(10.00), LedgerKind::Expense, Some("purchase")),
            tx(1, dec!(5.00), LedgerKind::Expense, Some("purchase")),
            tx(2, dec!(7.00), LedgerKind::Expense, None),
        ];
        let sums = by_category(&rows, LedgerKind::Expense);
        assert_eq!(sums.len(), 1);
        assert_eq!(sums["purchase"], 15.0);
    }

    #[test]
    fn income_and_expense_totals_are_separate() {
        let rows = vec![
            tx(1, dec!(100.00), LedgerKind::Income, Some("selling")),
            tx(1, dec!(30.00), LedgerKind::Expense, Some("purchase")),
        ];
        assert_eq!(sum_by_kind(&rows, LedgerKind::Income), dec!(100.00));
        assert_eq!(sum_by_kind(&rows, LedgerKind::Expense), dec!(30.00));
    }
}
