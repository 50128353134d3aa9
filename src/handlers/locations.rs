use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::entities::inventory_location::LocationType;
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::handlers::AppState;
use crate::services::locations::{CreateFacilityCommand, CreateLocationCommand};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacilityRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub address: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
    pub facility_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub location_type: LocationType,
    pub aisle: Option<String>,
    pub rack: Option<String>,
    pub shelf: Option<String>,
    pub bin: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LocationFilters {
    pub facility_id: Option<Uuid>,
}

/// Register a facility
#[utoipa::path(
    post,
    path = "/api/facilities",
    request_body = CreateFacilityRequest,
    responses(
        (status = 201, description = "Facility created"),
        (status = 409, description = "Facility code already in use")
    ),
    tag = "locations"
)]
pub async fn create_facility(
    State(state): State<AppState>,
    Json(payload): Json<CreateFacilityRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let facility = state
        .services
        .locations
        .create_facility(CreateFacilityCommand {
            code: payload.code,
            name: payload.name,
            address: payload.address,
            contact_email: payload.contact_email,
            contact_phone: payload.contact_phone,
        })
        .await?;
    Ok(created_response(facility))
}

/// List active facilities
#[utoipa::path(
    get,
    path = "/api/facilities",
    responses(
        (status = 200, description = "Facility list returned")
    ),
    tag = "locations"
)]
pub async fn list_facilities(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let facilities = state.services.locations.list_facilities().await?;
    Ok(success_response(facilities))
}

/// Add a storage location to a facility
#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created"),
        (status = 404, description = "Unknown or inactive facility")
    ),
    tag = "locations"
)]
pub async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let location = state
        .services
        .locations
        .create_location(CreateLocationCommand {
            facility_id: payload.facility_id,
            name: payload.name,
            location_type: payload.location_type,
            aisle: payload.aisle,
            rack: payload.rack,
            shelf: payload.shelf,
            bin: payload.bin,
            capacity: payload.capacity,
        })
        .await?;
    Ok(created_response(location))
}

/// List active locations, optionally within one facility
#[utoipa::path(
    get,
    path = "/api/locations",
    params(LocationFilters),
    responses(
        (status = 200, description = "Location list returned")
    ),
    tag = "locations"
)]
pub async fn list_locations(
    State(state): State<AppState>,
    Query(filters): Query<LocationFilters>,
) -> Result<Response, ServiceError> {
    let locations = state
        .services
        .locations
        .list_locations(filters.facility_id)
        .await?;
    Ok(success_response(locations))
}
