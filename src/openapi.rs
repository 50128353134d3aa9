use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::inventory_location::LocationType;
use crate::entities::user::UserRole;
use crate::entities::{
    component, facility, inventory_item, inventory_location, inventory_transaction,
    temporary_barcode, user,
};
use crate::errors::ErrorResponse;
use crate::handlers;
use crate::services::inventory::InventoryRow;
use crate::services::transactions::StockMovement;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WB-Tracks API",
        version = "1.0.0",
        description = r#"
# WB-Tracks Inventory Tracking API

Production inventory tracking across facilities and locations.

## Features

- **Component Catalog**: Parts registered by component number with barcode aliases
- **Multi-Facility Locations**: Warehouse, production, staging and quarantine locations
- **Transaction Engine**: Atomic add, transfer and consume operations with an immutable ledger
- **Low-Stock Detection**: Per-item thresholds with push notifications on crossings
- **Barcode Resolution**: Component numbers, assigned aliases and short-lived temporary codes
- **Change Stream**: Server-sent events for inventory and low-stock updates

## Error Handling

Errors carry a machine-readable `kind` alongside a human-readable message:

```json
{
  "error": "Insufficient stock",
  "kind": "insufficient_stock",
  "message": "requested 10, available 3",
  "request_id": "…",
  "timestamp": "2026-01-01T00:00:00Z"
}
```
        "#
    ),
    paths(
        handlers::health::health_check,
        handlers::inventory::list_inventory,
        handlers::inventory::list_low_stock,
        handlers::transactions::add_stock,
        handlers::transactions::transfer_stock,
        handlers::transactions::consume_stock,
        handlers::transactions::list_transactions,
        handlers::barcode::lookup,
        handlers::barcode::create_temporary,
        handlers::components::create_component,
        handlers::components::list_components,
        handlers::components::get_component,
        handlers::components::update_component,
        handlers::components::deactivate_component,
        handlers::locations::create_facility,
        handlers::locations::list_facilities,
        handlers::locations::create_location,
        handlers::locations::list_locations,
        handlers::users::create_user,
        handlers::users::list_users,
        handlers::users::set_role,
        handlers::users::deactivate_user,
        handlers::users::login,
        handlers::events::event_stream,
    ),
    components(schemas(
        component::Model,
        facility::Model,
        inventory_item::Model,
        inventory_location::Model,
        inventory_transaction::Model,
        temporary_barcode::Model,
        user::Model,
        LocationType,
        UserRole,
        InventoryRow,
        StockMovement,
        ErrorResponse,
        handlers::health::HealthResponse,
        handlers::transactions::AddStockRequest,
        handlers::transactions::TransferStockRequest,
        handlers::transactions::ConsumeStockRequest,
        handlers::barcode::BarcodeLookupRequest,
        handlers::barcode::CreateTemporaryBarcodeRequest,
        handlers::components::CreateComponentRequest,
        handlers::components::UpdateComponentRequest,
        handlers::locations::CreateFacilityRequest,
        handlers::locations::CreateLocationRequest,
        handlers::users::CreateUserRequest,
        handlers::users::SetRoleRequest,
        handlers::users::LoginRequest,
    )),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "inventory", description = "Current stock views"),
        (name = "transactions", description = "Stock movement ledger"),
        (name = "barcode", description = "Barcode and QR resolution"),
        (name = "components", description = "Component catalog"),
        (name = "locations", description = "Facilities and storage locations"),
        (name = "users", description = "User administration"),
        (name = "auth", description = "Credential verification"),
        (name = "events", description = "Change notifications"),
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/docs`, serving the generated document.
pub fn swagger_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().merge(
        SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
}
