use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities;
use crate::services;

/// OpenAPI document covering the wire types of every resource family.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "bodega-api",
        description = "Retail back-office API: point of sale, inventory, purchasing, payables, customers and reporting",
        license(name = "MIT")
    ),
    components(schemas(
        entities::product::Model,
        entities::category::Model,
        entities::customer::Model,
        entities::supplier::Model,
        entities::payment_method::Model,
        entities::order::Model,
        entities::order_item::Model,
        entities::purchase::Model,
        entities::purchase_item::Model,
        entities::payable::Model,
        entities::payable_payment::Model,
        entities::inventory_adjustment::Model,
        entities::inventory_adjustment_item::Model,
        entities::stock_movement::Model,
        entities::ledger_transaction::Model,
        services::catalog::CreateProductRequest,
        services::catalog::CreateCategoryRequest,
        services::customers::CustomerInput,
        services::suppliers::SupplierInput,
        services::transactions::TransactionInput,
        services::sales::CreateOrderRequest,
        services::sales::PosSaleRequest,
        services::sales::ManualOrderRequest,
        services::sales::SaleLine,
        services::sales::UpdateOrderRequest,
        services::sales::OrderResponse,
        services::sales::CustomerName,
        services::purchasing::CreatePurchaseRequest,
        services::purchasing::PurchaseLine,
        services::purchasing::PurchaseResponse,
        services::purchasing::SupplierName,
        services::payables::PayablePaymentRequest,
        services::payables::PayableResponse,
        services::payables::PaymentResult,
        services::payables::PurchaseRef,
        services::inventory::CreateAdjustmentRequest,
        services::inventory::AdjustmentLine,
        services::inventory::AdjustmentResponse,
        services::inventory::MovementResponse,
        services::inventory::ProductRef,
        services::notifications::Notification,
        services::notifications::NotificationSummary,
        services::notifications::NotificationsResponse,
        services::reports::RevenueTotal,
        services::reports::RevenueByCategory,
        services::reports::ExpensesTotal,
        services::reports::ExpensesByCategory,
        services::reports::ProfitTotal,
        services::reports::MarginPoint,
        services::reports::ProfitMargin,
        services::reports::CashFlow,
    )),
    tags(
        (name = "catalog", description = "Products and categories"),
        (name = "sales", description = "Orders and POS checkout"),
        (name = "purchasing", description = "Purchase intake and payables"),
        (name = "inventory", description = "Adjustments and the Kardex"),
        (name = "reports", description = "Ledger aggregations"),
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/swagger-ui`, serving the document above.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
