use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use strum::{Display, EnumString};

/// Direction of a ledger entry. Serialized into the `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    Income,
    Expense,
}

/// Well-known ledger categories written by the settlement procedures.
/// Manual entries may carry free-form categories.
pub mod categories {
    pub const SELLING: &str = "selling";
    pub const PURCHASE: &str = "purchase";
    pub const PAYABLE_PAYMENT: &str = "payable_payment";
}

/// One money movement. All revenue/expense/margin reports aggregate over
/// these rows; settlement code only ever appends.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = LedgerTransaction)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub r#type: String,
    pub category: Option<String>,
    pub status: String,
    pub description: Option<String>,
    pub payment_method_id: Option<i32>,
    pub order_id: Option<i32>,
    pub purchase_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payment_method::Entity",
        from = "Column::PaymentMethodId",
        to = "super::payment_method::Column::Id"
    )]
    PaymentMethod,
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(
        belongs_to = "super::purchase::Entity",
        from = "Column::PurchaseId",
        to = "super::purchase::Column::Id"
    )]
    Purchase,
}

impl ActiveModelBehavior for ActiveModel {}
