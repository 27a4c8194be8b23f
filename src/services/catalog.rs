use crate::{
    db::DbPool,
    entities::{category, product},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Fallback slug when a name folds down to nothing (e.g. all symbols).
const DEFAULT_SLUG: &str = "categoria";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub in_stock: i32,
    pub barcode: Option<String>,
    /// Denormalized category label; kept verbatim when provided.
    pub category: Option<String>,
    #[serde(default, rename = "categoryId")]
    pub category_id: Option<i32>,
    #[serde(default, rename = "categoryName")]
    pub category_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, rename = "parentId")]
    pub parent_id: Option<i32>,
    #[serde(default, rename = "isActive")]
    pub is_active: Option<bool>,
    #[serde(default, rename = "sortOrder")]
    pub sort_order: Option<i32>,
}

/// Products and categories: plain catalog records plus the slug and
/// category-upsert rules the product forms rely on.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)
    }

    #[instrument(skip(self))]
    pub async fn find_by_barcode(&self, barcode: &str) -> Result<product::Model, ServiceError> {
        product::Entity::find()
            .filter(product::Column::Barcode.eq(barcode))
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;

        let (category_label, category_id) = self.resolve_category(&request).await;
        let now = Utc::now();

        let model = product::ActiveModel {
            id: NotSet,
            name: Set(request.name),
            description: Set(request.description.filter(|d| !d.is_empty())),
            price: Set(request.price),
            in_stock: Set(request.in_stock),
            category: Set(category_label),
            category_id: Set(category_id),
            barcode: Set(normalize_barcode(request.barcode)),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| barcode_conflict(ServiceError::from_db(e)))
    }

    #[instrument(skip(self, request), fields(product_id = id))]
    pub async fn update_product(
        &self,
        id: i32,
        request: CreateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;

        let existing = product::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let (category_label, category_id) = self.resolve_category(&request).await;

        let mut model: product::ActiveModel = existing.into();
        model.name = Set(request.name);
        model.description = Set(request.description.filter(|d| !d.is_empty()));
        model.price = Set(request.price);
        model.in_stock = Set(request.in_stock);
        model.category = Set(category_label);
        model.category_id = Set(category_id);
        model.barcode = Set(normalize_barcode(request.barcode));
        model.updated_at = Set(Some(Utc::now()));

        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| barcode_conflict(ServiceError::from_db(e)))
    }

    /// Deletes a product together with its order lines (the original data
    /// model keeps no tombstones; reports read the ledger, not order rows).
    #[instrument(skip(self), fields(product_id = id))]
    pub async fn delete_product(&self, id: i32) -> Result<(), ServiceError> {
        let existing = product::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        crate::entities::order_item::Entity::delete_many()
            .filter(crate::entities::order_item::Column::ProductId.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;

        existing
            .delete(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<category::Model>, ServiceError> {
        category::Entity::find()
            .order_by_asc(category::Column::SortOrder)
            .order_by_asc(category::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)
    }

    #[instrument(skip(self, request))]
    pub async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<category::Model, ServiceError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::Validation("Name is required".to_string()));
        }

        let slug = self.generate_unique_slug(&name).await?;

        let model = category::ActiveModel {
            id: NotSet,
            name: Set(name),
            slug: Set(slug),
            code: Set(request.code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())),
            description: Set(request.description.filter(|d| !d.is_empty())),
            parent_id: Set(request.parent_id),
            is_active: Set(request.is_active.unwrap_or(true)),
            sort_order: Set(request.sort_order.unwrap_or(0)),
            created_at: Set(Utc::now()),
        };

        model.insert(self.db.as_ref()).await.map_err(|e| {
            match ServiceError::from_db(e) {
                ServiceError::Conflict(_) => {
                    ServiceError::Conflict("Category already exists".to_string())
                }
                other => other,
            }
        })
    }

    /// Derive a slug from `base` and suffix it with `-2`, `-3`, … until it
    /// no longer collides with an existing category.
    async fn generate_unique_slug(&self, base: &str) -> Result<String, ServiceError> {
        let mut root = slugify(base);
        if root.is_empty() {
            root = DEFAULT_SLUG.to_string();
        }
        let mut slug = root.clone();
        let mut i = 1;
        loop {
            let exists = category::Entity::find()
                .filter(category::Column::Slug.eq(slug.as_str()))
                .one(self.db.as_ref())
                .await
                .map_err(ServiceError::from_db)?;
            if exists.is_none() {
                return Ok(slug);
            }
            i += 1;
            slug = format!("{}-{}", root, i);
        }
    }

    /// Resolve the (label, id) pair for a product's category.
    ///
    /// An explicit id wins; otherwise a category name is looked up and
    /// created on the fly when missing. Resolution failures degrade to an
    /// uncategorized product instead of failing the product write.
    async fn resolve_category(&self, request: &CreateProductRequest) -> (Option<String>, Option<i32>) {
        let label = request
            .category
            .clone()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| {
                request
                    .category_name
                    .as_ref()
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty())
            });

        if let Some(id) = request.category_id {
            return (label, Some(id));
        }

        let Some(name) = request
            .category_name
            .as_ref()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
        else {
            return (label, None);
        };

        match self.upsert_category_by_name(&name).await {
            Ok(id) => (label, Some(id)),
            Err(err) => {
                warn!(error = %err, category = %name, "category resolution failed; product stays uncategorized");
                (label, None)
            }
        }
    }

    async fn upsert_category_by_name(&self, name: &str) -> Result<i32, ServiceError> {
        if let Some(existing) = category::Entity::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?
        {
            return Ok(existing.id);
        }

        let slug = self.generate_unique_slug(name).await?;
        let created = category::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            slug: Set(slug),
            code: Set(None),
            description: Set(None),
            parent_id: Set(None),
            is_active: Set(true),
            sort_order: Set(0),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.as_ref())
        .await
        .map_err(ServiceError::from_db)?;

        Ok(created.id)
    }
}

fn normalize_barcode(raw: Option<String>) -> Option<String> {
    raw.map(|b| b.trim().to_string()).filter(|b| !b.is_empty())
}

fn barcode_conflict(err: ServiceError) -> ServiceError {
    match err {
        ServiceError::Conflict(_) => ServiceError::Conflict("Barcode already exists".to_string()),
        other => other,
    }
}

/// ASCII-fold, lowercase and hyphenate a name into a URL slug.
///
/// Deterministic: the same input always yields the same slug. Non-ASCII
/// letters common in the catalog's locale fold to their base letter;
/// anything else collapses into a single hyphen separator.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;
    for c in input.chars() {
        match fold_char(c) {
            Some(ch) => {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push(ch);
            }
            None => pending_separator = true,
        }
    }
    slug
}

fn fold_char(c: char) -> Option<char> {
    let lower = c.to_lowercase().next().unwrap_or(c);
    let folded = match lower {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    };
    folded.is_ascii_alphanumeric().then_some(folded)
}
