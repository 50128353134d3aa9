pub mod barcode;
pub mod common;
pub mod components;
pub mod events;
pub mod health;
pub mod inventory;
pub mod locations;
pub mod transactions;
pub mod users;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::errors::ServiceError;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Identity of the caller, taken from the `x-user-id` header when present.
/// Token verification happens upstream; here we only need attribution for
/// the ledger's `created_by` column.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentUser(pub Option<Uuid>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get("x-user-id") else {
            return Ok(CurrentUser(None));
        };
        let raw = value.to_str().map_err(|_| {
            ServiceError::ValidationError("x-user-id header is not valid UTF-8".to_string())
        })?;
        let id = Uuid::parse_str(raw.trim()).map_err(|_| {
            ServiceError::ValidationError("x-user-id header is not a valid UUID".to_string())
        })?;
        Ok(CurrentUser(Some(id)))
    }
}
