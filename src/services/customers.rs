use crate::{db::DbPool, entities::customer, errors::ServiceError};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, EntityTrait, ModelTrait, QueryOrder, Set,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CustomerInput {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

pub async fn list_customers(db: &DbPool) -> Result<Vec<customer::Model>, ServiceError> {
    customer::Entity::find()
        .order_by_asc(customer::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::from_db)
}

pub async fn create_customer(
    db: &DbPool,
    input: CustomerInput,
) -> Result<customer::Model, ServiceError> {
    input.validate()?;
    customer::ActiveModel {
        id: NotSet,
        name: Set(input.name),
        email: Set(input.email),
        phone: Set(input.phone.filter(|p| !p.is_empty())),
        status: Set(input.status.unwrap_or_else(|| "active".to_string())),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .map_err(ServiceError::from_db)
}

pub async fn update_customer(
    db: &DbPool,
    id: i32,
    input: CustomerInput,
) -> Result<customer::Model, ServiceError> {
    input.validate()?;
    let existing = customer::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::from_db)?
        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;

    let mut model: customer::ActiveModel = existing.into();
    model.name = Set(input.name);
    model.email = Set(input.email);
    model.phone = Set(input.phone.filter(|p| !p.is_empty()));
    if let Some(status) = input.status {
        model.status = Set(status);
    }
    model.update(db).await.map_err(ServiceError::from_db)
}

pub async fn delete_customer(db: &DbPool, id: i32) -> Result<(), ServiceError> {
    let existing = customer::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::from_db)?
        .ok_or_else(|| ServiceError::NotFound("Customer not found".to_string()))?;
    existing.delete(db).await.map_err(ServiceError::from_db)?;
    Ok(())
}
