use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::handlers::{AppState, CurrentUser};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BarcodeLookupRequest {
    /// Scanned value: a component number, an assigned alias, or a temporary code.
    #[validate(length(min = 1, max = 255))]
    pub barcode: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemporaryBarcodeRequest {
    pub component_id: Uuid,
    #[validate(range(min = 1, max = 8760))]
    pub ttl_hours: Option<i64>,
}

/// Resolve a scanned code to a component
#[utoipa::path(
    post,
    path = "/api/barcode/lookup",
    request_body = BarcodeLookupRequest,
    responses(
        (status = 200, description = "Component resolved"),
        (status = 404, description = "No active component for this code")
    ),
    tag = "barcode"
)]
pub async fn lookup(
    State(state): State<AppState>,
    Json(payload): Json<BarcodeLookupRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let component = state.services.barcode.lookup(&payload.barcode).await?;
    Ok(success_response(component))
}

/// Mint a short-lived barcode for a component
#[utoipa::path(
    post,
    path = "/api/barcode/temporary",
    request_body = CreateTemporaryBarcodeRequest,
    responses(
        (status = 201, description = "Temporary barcode created"),
        (status = 404, description = "Unknown component")
    ),
    tag = "barcode"
)]
pub async fn create_temporary(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateTemporaryBarcodeRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let barcode = state
        .services
        .barcode
        .create_temporary(payload.component_id, payload.ttl_hours, user.0)
        .await?;
    Ok(created_response(barcode))
}
