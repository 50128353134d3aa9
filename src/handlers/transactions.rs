use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, validate_input, PaginationParams};
use crate::handlers::{AppState, CurrentUser};
use crate::services::transactions::{AddStockCommand, ConsumeStockCommand, TransferStockCommand};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddStockRequest {
    pub component_id: Uuid,
    pub location_id: Uuid,
    #[validate(range(min = 1, max = 1_000_000))]
    pub quantity: i32,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferStockRequest {
    pub component_id: Uuid,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    #[validate(range(min = 1, max = 1_000_000))]
    pub quantity: i32,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeStockRequest {
    pub component_id: Uuid,
    pub location_id: Uuid,
    #[validate(range(min = 1, max = 1_000_000))]
    pub quantity: i32,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    pub component_id: Option<Uuid>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Record an addition of stock at a location
#[utoipa::path(
    post,
    path = "/api/transactions/add",
    request_body = AddStockRequest,
    responses(
        (status = 201, description = "Stock added"),
        (status = 404, description = "Unknown component or location"),
        (status = 400, description = "Invalid quantity")
    ),
    tag = "transactions"
)]
pub async fn add_stock(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<AddStockRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let movement = state
        .services
        .transactions
        .add_stock(AddStockCommand {
            component_id: payload.component_id,
            location_id: payload.location_id,
            quantity: payload.quantity,
            notes: payload.notes,
            created_by: user.0,
        })
        .await?;
    Ok(created_response(movement))
}

/// Move stock between two locations in one atomic step
#[utoipa::path(
    post,
    path = "/api/transactions/transfer",
    request_body = TransferStockRequest,
    responses(
        (status = 201, description = "Stock transferred"),
        (status = 422, description = "Insufficient stock at the source"),
        (status = 400, description = "Invalid quantity or identical locations")
    ),
    tag = "transactions"
)]
pub async fn transfer_stock(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<TransferStockRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let movement = state
        .services
        .transactions
        .transfer_stock(TransferStockCommand {
            component_id: payload.component_id,
            from_location_id: payload.from_location_id,
            to_location_id: payload.to_location_id,
            quantity: payload.quantity,
            notes: payload.notes,
            created_by: user.0,
        })
        .await?;
    Ok(created_response(movement))
}

/// Consume stock out of a location
#[utoipa::path(
    post,
    path = "/api/transactions/consume",
    request_body = ConsumeStockRequest,
    responses(
        (status = 201, description = "Stock consumed"),
        (status = 422, description = "Insufficient stock"),
        (status = 400, description = "Invalid quantity")
    ),
    tag = "transactions"
)]
pub async fn consume_stock(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ConsumeStockRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let movement = state
        .services
        .transactions
        .consume_stock(ConsumeStockCommand {
            component_id: payload.component_id,
            location_id: payload.location_id,
            quantity: payload.quantity,
            notes: payload.notes,
            created_by: user.0,
        })
        .await?;
    Ok(created_response(movement))
}

/// Ledger history, newest first
#[utoipa::path(
    get,
    path = "/api/transactions",
    params(TransactionFilters),
    responses(
        (status = 200, description = "Transaction list returned")
    ),
    tag = "transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(filters): Query<TransactionFilters>,
) -> Result<Response, ServiceError> {
    let defaults = PaginationParams::default();
    let page = PaginationParams {
        limit: filters.limit.unwrap_or(defaults.limit),
        offset: filters.offset.unwrap_or(defaults.offset),
    };
    let rows = state
        .services
        .transactions
        .list_transactions(filters.component_id, page.clamped_limit(), page.offset)
        .await?;
    Ok(success_response(rows))
}
