use crate::{db::DbPool, entities::supplier, errors::ServiceError};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, EntityTrait, ModelTrait, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SupplierInput {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl SupplierInput {
    fn normalized_name(&self) -> Result<String, ServiceError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::Validation("Name is required".to_string()));
        }
        Ok(name)
    }
}

pub async fn list_suppliers(db: &DbPool) -> Result<Vec<supplier::Model>, ServiceError> {
    supplier::Entity::find()
        .order_by_asc(supplier::Column::Name)
        .all(db)
        .await
        .map_err(ServiceError::from_db)
}

pub async fn create_supplier(
    db: &DbPool,
    input: SupplierInput,
) -> Result<supplier::Model, ServiceError> {
    let name = input.normalized_name()?;
    supplier::ActiveModel {
        id: NotSet,
        name: Set(name),
        email: Set(input.email.filter(|v| !v.is_empty())),
        phone: Set(input.phone.filter(|v| !v.is_empty())),
        address: Set(input.address.filter(|v| !v.is_empty())),
        tax_id: Set(input.tax_id.filter(|v| !v.is_empty())),
        status: Set(input.status.unwrap_or_else(|| "active".to_string())),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .map_err(ServiceError::from_db)
}

pub async fn update_supplier(
    db: &DbPool,
    id: i32,
    input: SupplierInput,
) -> Result<supplier::Model, ServiceError> {
    let name = input.normalized_name()?;
    let existing = supplier::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::from_db)?
        .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))?;

    let mut model: supplier::ActiveModel = existing.into();
    model.name = Set(name);
    model.email = Set(input.email.filter(|v| !v.is_empty()));
    model.phone = Set(input.phone.filter(|v| !v.is_empty()));
    model.address = Set(input.address.filter(|v| !v.is_empty()));
    model.tax_id = Set(input.tax_id.filter(|v| !v.is_empty()));
    if let Some(status) = input.status {
        model.status = Set(status);
    }
    model.update(db).await.map_err(ServiceError::from_db)
}

pub async fn delete_supplier(db: &DbPool, id: i32) -> Result<(), ServiceError> {
    let existing = supplier::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::from_db)?
        .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))?;
    existing.delete(db).await.map_err(ServiceError::from_db)?;
    Ok(())
}
