//! HTTP handlers, one module per resource family.

pub mod categories;
pub mod customers;
pub mod health;
pub mod inventory;
pub mod notifications;
pub mod orders;
pub mod payables;
pub mod payment_methods;
pub mod products;
pub mod purchases;
pub mod reports;
pub mod suppliers;
pub mod transactions;

use crate::db::DbPool;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<crate::services::catalog::CatalogService>,
    pub sales: Arc<crate::services::sales::SalesService>,
    pub purchasing: Arc<crate::services::purchasing::PurchasingService>,
    pub payables: Arc<crate::services::payables::PayableService>,
    pub inventory: Arc<crate::services::inventory::InventoryService>,
    pub reports: Arc<crate::services::reports::ReportService>,
    pub notifications: Arc<crate::services::notifications::NotificationService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            catalog: Arc::new(crate::services::catalog::CatalogService::new(db.clone())),
            sales: Arc::new(crate::services::sales::SalesService::new(db.clone())),
            purchasing: Arc::new(crate::services::purchasing::PurchasingService::new(
                db.clone(),
            )),
            payables: Arc::new(crate::services::payables::PayableService::new(db.clone())),
            inventory: Arc::new(crate::services::inventory::InventoryService::new(db.clone())),
            reports: Arc::new(crate::services::reports::ReportService::new(db.clone())),
            notifications: Arc::new(crate::services::notifications::NotificationService::new(db)),
        }
    }
}
