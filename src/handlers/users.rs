use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::user::UserRole;
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, validate_input};
use crate::handlers::AppState;
use crate::services::users::CreateUserCommand;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(length(min = 1, max = 255))]
    pub display_name: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Create a user account
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created"),
        (status = 409, description = "Username already taken")
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let user = state
        .services
        .users
        .create_user(CreateUserCommand {
            username: payload.username,
            display_name: payload.display_name,
            password: payload.password,
            role: payload.role,
        })
        .await?;
    Ok(created_response(user))
}

/// List all user accounts
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "User list returned")
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Response, ServiceError> {
    let users = state.services.users.list_users().await?;
    Ok(success_response(users))
}

/// Change a user's role
#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role updated"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn set_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRoleRequest>,
) -> Result<Response, ServiceError> {
    let user = state.services.users.set_role(id, payload.role).await?;
    Ok(success_response(user))
}

/// Disable an account; the row stays for attribution of past transactions
#[utoipa::path(
    post,
    path = "/api/users/{id}/deactivate",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deactivated"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let user = state.services.users.deactivate(id).await?;
    Ok(success_response(user))
}

/// Verify a username/password pair
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ServiceError> {
    validate_input(&payload)?;
    let user = state
        .services
        .users
        .verify_credentials(&payload.username, &payload.password)
        .await?;
    Ok(success_response(user))
}
