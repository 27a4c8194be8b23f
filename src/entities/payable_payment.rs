use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = PayablePayment)]
#[sea_orm(table_name = "payable_payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub payable_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payable::Entity",
        from = "Column::PayableId",
        to = "super::payable::Column::Id"
    )]
    Payable,
}

impl Related<super::payable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payable.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
