use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::handlers::{AppState, CurrentUser};
use crate::services::components::{CreateComponentCommand, UpdateComponentCommand};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateComponentRequest {
    #[validate(length(min = 1, max = 100))]
    pub component_number: String,
    #[validate(length(min = 1, max = 1000))]
    pub description: String,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub unit_price: Option<Decimal>,
    pub plate_number: Option<String>,
    pub barcode: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComponentRequest {
    #[validate(length(min = 1, max = 1000))]
    pub description: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub unit_price: Option<Decimal>,
    pub plate_number: Option<String>,
    pub barcode: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ComponentFilters {
    pub include_inactive: Option<bool>,
}

/// Register a new component in the catalog
#[utoipa::path(
    post,
    path = "/api/components",
    request_body = CreateComponentRequest,
    responses(
        (status = 201, description = "Component created"),
        (status = 409, description = "Component number already in use")
    ),
    tag = "components"
)]
pub async fn create_component(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateComponentRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let component = state
        .services
        .components
        .create(CreateComponentCommand {
            component_number: payload.component_number,
            description: payload.description,
            category: payload.category,
            supplier: payload.supplier,
            unit_price: payload.unit_price,
            plate_number: payload.plate_number,
            barcode: payload.barcode,
            created_by: user.0,
        })
        .await?;
    Ok(created_response(component))
}

/// List components, active by default
#[utoipa::path(
    get,
    path = "/api/components",
    params(ComponentFilters),
    responses(
        (status = 200, description = "Component list returned")
    ),
    tag = "components"
)]
pub async fn list_components(
    State(state): State<AppState>,
    Query(filters): Query<ComponentFilters>,
) -> Result<Response, ServiceError> {
    let components = state
        .services
        .components
        .list(filters.include_inactive.unwrap_or(false))
        .await?;
    Ok(success_response(components))
}

/// Fetch one component by id
#[utoipa::path(
    get,
    path = "/api/components/{id}",
    params(("id" = Uuid, Path, description = "Component id")),
    responses(
        (status = 200, description = "Component returned"),
        (status = 404, description = "Component not found")
    ),
    tag = "components"
)]
pub async fn get_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let component = state.services.components.get(id).await?;
    Ok(success_response(component))
}

/// Update component metadata
#[utoipa::path(
    put,
    path = "/api/components/{id}",
    params(("id" = Uuid, Path, description = "Component id")),
    request_body = UpdateComponentRequest,
    responses(
        (status = 200, description = "Component updated"),
        (status = 404, description = "Component not found")
    ),
    tag = "components"
)]
pub async fn update_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: CurrentUser,
    Json(payload): Json<UpdateComponentRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let component = state
        .services
        .components
        .update(
            id,
            UpdateComponentCommand {
                description: payload.description,
                category: payload.category,
                supplier: payload.supplier,
                unit_price: payload.unit_price,
                plate_number: payload.plate_number,
                barcode: payload.barcode,
                updated_by: user.0,
            },
        )
        .await?;
    Ok(success_response(component))
}

/// Retire a component without deleting its history
#[utoipa::path(
    post,
    path = "/api/components/{id}/deactivate",
    params(("id" = Uuid, Path, description = "Component id")),
    responses(
        (status = 200, description = "Component deactivated"),
        (status = 404, description = "Component not found")
    ),
    tag = "components"
)]
pub async fn deactivate_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: CurrentUser,
) -> Result<Response, ServiceError> {
    let component = state.services.components.deactivate(id, user.0).await?;
    Ok(success_response(component))
}
