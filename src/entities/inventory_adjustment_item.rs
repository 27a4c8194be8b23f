use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One product delta inside an adjustment. `quantity` is signed and never
/// zero; negative values shrink stock below zero if needed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = InventoryAdjustmentItem)]
#[sea_orm(table_name = "inventory_adjustment_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub adjustment_id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub note: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_adjustment::Entity",
        from = "Column::AdjustmentId",
        to = "super::inventory_adjustment::Column::Id"
    )]
    Adjustment,
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::inventory_adjustment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adjustment.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
