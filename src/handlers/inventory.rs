use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::handlers::common::success_response;
use crate::handlers::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct InventoryFilters {
    pub location_id: Option<Uuid>,
}

/// Current stock, joined with component and location details
#[utoipa::path(
    get,
    path = "/api/inventory",
    params(InventoryFilters),
    responses(
        (status = 200, description = "Inventory list returned")
    ),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(filters): Query<InventoryFilters>,
) -> Result<Response, ServiceError> {
    let rows = state
        .services
        .inventory
        .get_inventory(filters.location_id)
        .await?;
    Ok(success_response(rows))
}

/// Rows at or below their minimum stock level
#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    responses(
        (status = 200, description = "Low stock list returned")
    ),
    tag = "inventory"
)]
pub async fn list_low_stock(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let rows = state.services.inventory.get_low_stock().await?;
    Ok(success_response(rows))
}
