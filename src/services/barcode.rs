use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::instrument;
use uuid::Uuid;

use crate::entities::{component, temporary_barcode};
use crate::errors::ServiceError;

const TEMP_BARCODE_PREFIX: &str = "WB-TMP-";

/// Maps a scanned code to a component. Read-mostly; sits beside, not inside,
/// the transaction engine.
#[derive(Clone)]
pub struct BarcodeService {
    db: Arc<DatabaseConnection>,
    default_ttl_hours: i64,
}

impl BarcodeService {
    pub fn new(db: Arc<DatabaseConnection>, default_ttl_hours: i64) -> Self {
        Self {
            db,
            default_ttl_hours,
        }
    }

    /// Resolves a scanned code: component number first, then the component's
    /// assigned barcode alias, then temporary barcodes. A hit on a temporary
    /// barcode increments its usage counter; expired or deactivated temporary
    /// codes fail with `NotFound` even though the row still exists.
    #[instrument(skip(self))]
    pub async fn lookup(&self, code: &str) -> Result<component::Model, ServiceError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ServiceError::ValidationError(
                "barcode must not be empty".to_string(),
            ));
        }

        let direct = component::Entity::find()
            .filter(
                Condition::any()
                    .add(component::Column::ComponentNumber.eq(code))
                    .add(component::Column::Barcode.eq(code)),
            )
            .one(self.db.as_ref())
            .await?;

        if let Some(component) = direct {
            if component.active {
                return Ok(component);
            }
            return Err(ServiceError::NotFound(format!(
                "no active component for code {}",
                code
            )));
        }

        let temporary = temporary_barcode::Entity::find()
            .filter(temporary_barcode::Column::Barcode.eq(code))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("unknown barcode {}", code)))?;

        if !temporary.active || temporary.is_expired(Utc::now()) {
            return Err(ServiceError::NotFound(format!(
                "barcode {} is expired or inactive",
                code
            )));
        }

        let component = component::Entity::find_by_id(temporary.component_id)
            .one(self.db.as_ref())
            .await?
            .filter(|c| c.active)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("no active component for code {}", code))
            })?;

        temporary_barcode::Entity::update_many()
            .col_expr(
                temporary_barcode::Column::UsageCount,
                Expr::col(temporary_barcode::Column::UsageCount).add(1),
            )
            .filter(temporary_barcode::Column::Id.eq(temporary.id))
            .exec(self.db.as_ref())
            .await?;

        Ok(component)
    }

    /// Mints a temporary barcode for a component with a bounded lifetime.
    #[instrument(skip(self))]
    pub async fn create_temporary(
        &self,
        component_id: Uuid,
        ttl_hours: Option<i64>,
        created_by: Option<Uuid>,
    ) -> Result<temporary_barcode::Model, ServiceError> {
        let component = component::Entity::find_by_id(component_id)
            .one(self.db.as_ref())
            .await?
            .filter(|c| c.active)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("component {} not found or inactive", component_id))
            })?;

        let ttl = ttl_hours.unwrap_or(self.default_ttl_hours);
        if ttl <= 0 {
            return Err(ServiceError::ValidationError(
                "ttl_hours must be positive".to_string(),
            ));
        }

        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(8)
            .map(char::from)
            .collect::<String>()
            .to_uppercase();

        let row = temporary_barcode::ActiveModel {
            id: Set(Uuid::new_v4()),
            barcode: Set(format!("{}{}", TEMP_BARCODE_PREFIX, suffix)),
            component_id: Set(component.id),
            expires_at: Set(Utc::now() + Duration::hours(ttl)),
            usage_count: Set(0),
            active: Set(true),
            created_by: Set(created_by),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.as_ref())
        .await?;

        Ok(row)
    }
}
